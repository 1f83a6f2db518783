// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{StockRepository, StockStore},
    services::{AllocationService, CatalogService},
};

// Configuração lida do ambiente (.env é opcional).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub allocation_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub insert_test_data: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            allocation_timeout: Duration::from_secs(parse_var("ALLOCATION_TIMEOUT_SECS", 10)?),
            shutdown_timeout: Duration::from_secs(parse_var("SHUTDOWN_TIMEOUT_SECS", 5)?),
            insert_test_data: parse_var("INSERT_TEST_DATA", false)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout)
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub allocation_service: AllocationService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub fn new(pool: PgPool, settings: &Settings) -> Self {
        Self::with_store(Arc::new(StockRepository::new(pool)), settings.allocation_timeout)
    }

    // --- Monta o gráfico de dependências ---
    // Os dois serviços compartilham o mesmo store.
    pub fn with_store(store: Arc<dyn StockStore>, allocation_timeout: Duration) -> Self {
        Self {
            allocation_service: AllocationService::new(store.clone(), allocation_timeout),
            catalog_service: CatalogService::new(store),
        }
    }
}
