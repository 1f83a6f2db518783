//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::db::{SeedData, StockRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let db_pool = settings.connect().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if settings.insert_test_data {
        StockRepository::new(db_pool.clone())
            .insert_test_data(&SeedData::demo())
            .await?;
    }

    let app = app_router(AppState::new(db_pool.clone(), &settings))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()));

    let listener = TcpListener::bind(settings.address()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Dá um prazo para as conexões devolverem antes de fechar a pool.
    if tokio::time::timeout(settings.shutdown_timeout, db_pool.close()).await.is_err() {
        tracing::warn!("Pool de conexões não fechou dentro do prazo");
    }
    tracing::info!("Servidor encerrado");
    Ok(())
}

pub(crate) fn app_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/ping", get(handlers::stock::ping))
        .route("/getRemainingProducts", get(handlers::stock::get_remaining_products))
        .route("/reserveProducts", post(handlers::stock::reserve_products))
        .route("/releaseProducts", post(handlers::stock::release_products));

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::cors::cors))
        .layer(axum_middleware::from_fn(middleware::request_log::request_log))
        .with_state(app_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Falha ao escutar Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Falha ao escutar SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Sinal de parada recebido, encerrando...");
}
