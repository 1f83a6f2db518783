// src/db/memory_repo.rs
//
// StockStore em memória para os testes de serviço e de handler.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        seed::{SeedData, SeedStock},
        stock_repo::StockStore,
    },
    models::warehouse::{ArticleSplit, Product, StockRow, Warehouse, WarehouseProduct},
};

#[derive(Debug, Default)]
struct MemoryState {
    data: SeedData,
    read_delay: Option<Duration>,
    write_delay: Option<Duration>,
    vanish_on_write: Option<(Uuid, String)>,
    reservation_writes: usize,
    release_writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStockStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Clone, Copy)]
enum WriteKind {
    Reserve,
    Release,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(data: SeedData) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().data = data;
        store
    }

    /// Armazéns entram em ordem de criação.
    pub fn with_warehouse(self, uuid: Uuid, is_available: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let offset = state.data.warehouses.len() as i64;
            state.data.warehouses.push(Warehouse {
                uuid,
                name: format!("warehouse-{offset}"),
                is_available,
                created_at: Utc::now() + TimeDelta::seconds(offset),
            });
        }
        self
    }

    pub fn with_product(self, article: &str, name: &str, size: &str) -> Self {
        self.state.lock().unwrap().data.products.push(Product {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            size: size.to_string(),
            article: article.to_string(),
        });
        self
    }

    /// Cria o produto sob demanda se o artigo ainda não existir.
    /// Um par (armazém, produto) só pode aparecer uma vez, como na chave primária da tabela.
    pub fn with_stock(self, warehouse_uuid: Uuid, article: &str, quantity: i64, reserved_quantity: i64) -> Self {
        let store = if self.product_uuid(article).is_none() {
            self.with_product(article, &format!("product-{article}"), "M")
        } else {
            self
        };
        {
            let mut state = store.state.lock().unwrap();
            let product_uuid = product_uuid_in(&state.data, article).unwrap();
            let duplicated = state
                .data
                .stock
                .iter()
                .any(|s| s.warehouse_uuid == warehouse_uuid && s.product_uuid == product_uuid);
            assert!(!duplicated, "linha duplicada em warehouse_products ({warehouse_uuid}, {article})");
            state.data.stock.push(SeedStock {
                warehouse_uuid,
                product_uuid,
                quantity,
                reserved_quantity,
            });
        }
        store
    }

    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().unwrap().read_delay = Some(delay);
    }

    /// Atraso dentro da escrita, antes de aplicar o plano.
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().unwrap().write_delay = Some(delay);
    }

    /// Remove a linha no início da próxima escrita, simulando uma leitura velha.
    pub fn vanish_on_next_write(&self, warehouse_uuid: Uuid, article: &str) {
        self.state.lock().unwrap().vanish_on_write = Some((warehouse_uuid, article.to_string()));
    }

    /// (quantity, reserved_quantity) de uma linha.
    pub fn stock_of(&self, warehouse_uuid: Uuid, article: &str) -> Option<(i64, i64)> {
        let state = self.state.lock().unwrap();
        let product_uuid = product_uuid_in(&state.data, article)?;
        state
            .data
            .stock
            .iter()
            .find(|s| s.warehouse_uuid == warehouse_uuid && s.product_uuid == product_uuid)
            .map(|s| (s.quantity, s.reserved_quantity))
    }

    /// Soma de (quantity, reserved_quantity) do artigo em todos os armazéns.
    pub fn totals(&self, article: &str) -> (i64, i64) {
        let state = self.state.lock().unwrap();
        let Some(product_uuid) = product_uuid_in(&state.data, article) else {
            return (0, 0);
        };
        state
            .data
            .stock
            .iter()
            .filter(|s| s.product_uuid == product_uuid)
            .fold((0, 0), |(q, r), s| (q + s.quantity, r + s.reserved_quantity))
    }

    pub fn all_rows_non_negative(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.data.stock.iter().all(|s| s.quantity >= 0 && s.reserved_quantity >= 0)
    }

    pub fn reservation_writes(&self) -> usize {
        self.state.lock().unwrap().reservation_writes
    }

    pub fn release_writes(&self) -> usize {
        self.state.lock().unwrap().release_writes
    }

    fn product_uuid(&self, article: &str) -> Option<Uuid> {
        product_uuid_in(&self.state.lock().unwrap().data, article)
    }

    fn is_available(data: &SeedData, warehouse_uuid: Uuid) -> Option<&Warehouse> {
        data.warehouses
            .iter()
            .find(|w| w.uuid == warehouse_uuid && w.is_available)
    }

    async fn pause_for_read(&self) {
        let delay = self.state.lock().unwrap().read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn pause_for_write(&self) {
        let delay = self.state.lock().unwrap().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    // Aplica o plano numa cópia e só publica se todas as linhas existirem e ficarem >= 0.
    fn apply(&self, plan: &[ArticleSplit], kind: WriteKind) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        match kind {
            WriteKind::Reserve => state.reservation_writes += 1,
            WriteKind::Release => state.release_writes += 1,
        }

        if let Some((warehouse_uuid, article)) = state.vanish_on_write.take() {
            if let Some(product_uuid) = product_uuid_in(&state.data, &article) {
                state
                    .data
                    .stock
                    .retain(|s| !(s.warehouse_uuid == warehouse_uuid && s.product_uuid == product_uuid));
            }
        }

        let mut working = state.data.stock.clone();
        for split in plan {
            let product_uuid = product_uuid_in(&state.data, &split.article);
            for entry in &split.warehouses {
                let row = working.iter_mut().find(|s| {
                    Some(s.product_uuid) == product_uuid && s.warehouse_uuid == entry.warehouse_uuid
                });
                let Some(row) = row else {
                    return match kind {
                        WriteKind::Reserve => Err(AppError::ConcurrentModification {
                            article: split.article.clone(),
                            warehouse_uuid: entry.warehouse_uuid,
                        }),
                        WriteKind::Release => Ok(()),
                    };
                };
                match kind {
                    WriteKind::Reserve => {
                        row.quantity -= entry.count;
                        row.reserved_quantity += entry.count;
                    }
                    WriteKind::Release => row.reserved_quantity -= entry.count,
                }
                if row.quantity < 0 || row.reserved_quantity < 0 {
                    return Err(AppError::InternalServerError(anyhow!(
                        "violação de CHECK em warehouse_products ({}, {})",
                        split.article,
                        entry.warehouse_uuid
                    )));
                }
            }
        }

        state.data.stock = working;
        Ok(())
    }
}

fn product_uuid_in(data: &SeedData, article: &str) -> Option<Uuid> {
    data.products.iter().find(|p| p.article == article).map(|p| p.uuid)
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn get_availability(&self, article: &str) -> Result<Vec<WarehouseProduct>, AppError> {
        self.pause_for_read().await;

        let state = self.state.lock().unwrap();
        let Some(product_uuid) = product_uuid_in(&state.data, article) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(&Warehouse, WarehouseProduct)> = state
            .data
            .stock
            .iter()
            .filter(|s| s.product_uuid == product_uuid)
            .filter_map(|s| {
                Self::is_available(&state.data, s.warehouse_uuid).map(|w| {
                    (
                        w,
                        WarehouseProduct {
                            warehouse_uuid: s.warehouse_uuid,
                            quantity: s.quantity,
                            reserved_quantity: s.reserved_quantity,
                        },
                    )
                })
            })
            .collect();
        rows.sort_by_key(|(w, _)| (w.created_at, w.uuid));

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    async fn get_remaining_stock(&self, warehouse_uuid: Uuid) -> Result<Vec<StockRow>, AppError> {
        let state = self.state.lock().unwrap();
        if Self::is_available(&state.data, warehouse_uuid).is_none() {
            return Ok(Vec::new());
        }

        let mut rows: Vec<StockRow> = state
            .data
            .stock
            .iter()
            .filter(|s| s.warehouse_uuid == warehouse_uuid)
            .filter_map(|s| {
                state.data.products.iter().find(|p| p.uuid == s.product_uuid).map(|p| StockRow {
                    name: p.name.clone(),
                    size: p.size.clone(),
                    article: p.article.clone(),
                    quantity: s.quantity,
                })
            })
            .collect();
        rows.sort_by(|a, b| (&a.name, &a.article).cmp(&(&b.name, &b.article)));

        Ok(rows)
    }

    async fn apply_reservation(&self, plan: &[ArticleSplit]) -> Result<(), AppError> {
        self.pause_for_write().await;
        self.apply(plan, WriteKind::Reserve)
    }

    async fn apply_release(&self, plan: &[ArticleSplit]) -> Result<(), AppError> {
        self.pause_for_write().await;
        self.apply(plan, WriteKind::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "linha duplicada")]
    fn duplicated_stock_row_is_rejected() {
        let w1 = Uuid::new_v4();
        let _ = InMemoryStockStore::new()
            .with_warehouse(w1, true)
            .with_stock(w1, "A", 1, 0)
            .with_stock(w1, "A", 2, 0);
    }

    #[test]
    fn same_article_in_two_warehouses_is_allowed() {
        let (w1, w2) = (Uuid::new_v4(), Uuid::new_v4());
        let store = InMemoryStockStore::new()
            .with_warehouse(w1, true)
            .with_warehouse(w2, true)
            .with_stock(w1, "A", 1, 0)
            .with_stock(w2, "A", 2, 0);

        assert_eq!(store.totals("A"), (3, 0));
    }
}
