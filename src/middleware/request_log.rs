// src/middleware/request_log.rs

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

// Uma linha de log por requisição: método, caminho, status e duração.
pub async fn request_log(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), elapsed_ms, "requisição falhou");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "requisição");
    }

    response
}
