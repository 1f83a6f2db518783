// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Stock ---
        handlers::stock::ping,
        handlers::stock::get_remaining_products,
        handlers::stock::reserve_products,
        handlers::stock::release_products,
    ),
    components(
        schemas(
            models::warehouse::ProductView,
        )
    ),
    tags(
        (name = "Stock", description = "Saldo por armazém, reserva e liberação de produtos")
    )
)]
pub struct ApiDoc;
