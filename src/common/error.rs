use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Um único tipo de erro para store, serviços e handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("warehouse_uuid inválido: {0}")]
    InvalidWarehouseId(String),

    // A demanda de um artigo excede o saldo somado dos armazéns disponíveis.
    #[error("Estoque insuficiente para o artigo {article}")]
    InsufficientStock { article: String },

    // O UPDATE condicional não afetou nenhuma linha: a leitura ficou velha.
    #[error("Saldo do artigo {article} no armazém {warehouse_uuid} mudou durante a operação")]
    ConcurrentModification { article: String, warehouse_uuid: Uuid },

    #[error("Tempo limite da operação de estoque esgotado")]
    Timeout,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidWarehouseId(_) | AppError::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::ConcurrentModification { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),

            // DatabaseError e InternalServerError viram 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
