// src/handlers/stock.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{common::error::AppError, config::AppState, models::warehouse::ProductView};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemainingProductsQuery {
    #[validate(length(min = 1, message = "warehouse_uuid é obrigatório."))]
    #[serde(default)]
    pub warehouse_uuid: String,
}

// O corpo de reserve/release é um array JSON de artigos; repetições contam como unidades.
fn validate_articles(articles: &[String]) -> Result<(), AppError> {
    if articles.iter().any(|a| a.trim().is_empty()) {
        let mut err = ValidationError::new("blank_article");
        err.message = Some("Artigos não podem ser vazios.".into());
        let mut errors = ValidationErrors::new();
        errors.add("articles", err);
        return Err(AppError::ValidationError(errors));
    }
    Ok(())
}

// GET /api/ping
#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "Stock",
    responses((status = 200, description = "Serviço no ar"))
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": "pong" })))
}

// GET /api/getRemainingProducts?warehouse_uuid=...
#[utoipa::path(
    get,
    path = "/api/getRemainingProducts",
    tag = "Stock",
    params(RemainingProductsQuery),
    responses(
        (status = 200, description = "Saldo restante por produto", body = Vec<ProductView>),
        (status = 400, description = "warehouse_uuid ausente ou inválido")
    )
)]
pub async fn get_remaining_products(
    State(app_state): State<AppState>,
    Query(query): Query<RemainingProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let warehouse_uuid = Uuid::parse_str(query.warehouse_uuid.trim())
        .map_err(|_| AppError::InvalidWarehouseId(query.warehouse_uuid.clone()))?;

    let products = app_state
        .catalog_service
        .remaining_stock(warehouse_uuid)
        .await?;

    Ok((StatusCode::OK, Json(products)))
}

// POST /api/reserveProducts
#[utoipa::path(
    post,
    path = "/api/reserveProducts",
    tag = "Stock",
    request_body(content = Vec<String>, description = "Artigos a reservar (repetir = mais unidades)"),
    responses(
        (status = 200, description = "Reserva gravada"),
        (status = 400, description = "Estoque insuficiente ou corpo inválido"),
        (status = 409, description = "Saldo alterado durante a operação"),
        (status = 503, description = "Tempo limite esgotado")
    )
)]
pub async fn reserve_products(
    State(app_state): State<AppState>,
    Json(articles): Json<Vec<String>>,
) -> Result<impl IntoResponse, AppError> {
    validate_articles(&articles)?;

    app_state.allocation_service.reserve(&articles).await?;

    Ok((StatusCode::OK, Json(json!({ "message": "OK" }))))
}

// POST /api/releaseProducts
#[utoipa::path(
    post,
    path = "/api/releaseProducts",
    tag = "Stock",
    request_body(content = Vec<String>, description = "Artigos a liberar (repetir = mais unidades)"),
    responses(
        (status = 200, description = "Liberação aceita (também quando não havia reserva suficiente)"),
        (status = 400, description = "Corpo inválido"),
        (status = 503, description = "Tempo limite esgotado")
    )
)]
pub async fn release_products(
    State(app_state): State<AppState>,
    Json(articles): Json<Vec<String>>,
) -> Result<impl IntoResponse, AppError> {
    validate_articles(&articles)?;

    app_state.allocation_service.release(&articles).await?;

    Ok((StatusCode::OK, Json(json!({ "message": "OK" }))))
}
