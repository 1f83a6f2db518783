// src/models/warehouse.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Armazém ---
// Armazéns indisponíveis (is_available = false) ficam fora de tudo: consultas e alocações.
#[derive(Debug, Clone, FromRow)]
pub struct Warehouse {
    pub uuid: Uuid,
    pub name: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>, // Define a ordem de consumo na alocação
}

// --- 2. Produto (catálogo) ---
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub uuid: Uuid,
    pub name: String,
    pub size: String,
    pub article: String, // Chave natural, única por produto
}

// --- 3. Saldo de um produto em um armazém ---
// Representa uma linha de 'warehouse_products' vista pela alocação.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct WarehouseProduct {
    pub warehouse_uuid: Uuid,
    pub quantity: i64,          // Livre para novas reservas
    pub reserved_quantity: i64, // Já reservado (não é subtraído de quantity)
}

// --- 4. Plano de alocação ---
// Quanto tirar (ou devolver) de cada armazém para um artigo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseCount {
    pub warehouse_uuid: Uuid,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSplit {
    pub article: String,
    pub warehouses: Vec<WarehouseCount>,
}

impl ArticleSplit {
    pub fn total(&self) -> i64 {
        self.warehouses.iter().map(|w| w.count).sum()
    }
}

// --- 5. Saldo restante de um armazém ---
// Linha crua devolvida pelo store; o CatalogService agrega por produto.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StockRow {
    pub name: String,
    pub size: String,
    pub article: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub name: String,
    pub size: String,
    pub code: String,
    pub quantity: i64,
}
