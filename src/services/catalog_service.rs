// src/services/catalog_service.rs

use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;

use uuid::Uuid;

use crate::{common::error::AppError, db::StockStore, models::warehouse::ProductView};

// Leitura pura: não passa pelo mutex de alocação.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn StockStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }

    /// Saldo restante de um armazém, uma entrada por produto (name, size, code).
    /// Como `code` é único por produto, produtos com o mesmo nome e tamanho continuam separados.
    pub async fn remaining_stock(&self, warehouse_uuid: Uuid) -> Result<Vec<ProductView>, AppError> {
        let rows = self.store.get_remaining_stock(warehouse_uuid).await?;

        let mut index: HashMap<(String, String, String), usize> = HashMap::new();
        let mut products: Vec<ProductView> = Vec::new();
        for row in rows {
            let key = (row.name.clone(), row.size.clone(), row.article.clone());
            match index.entry(key) {
                Entry::Occupied(slot) => products[*slot.get()].quantity += row.quantity,
                Entry::Vacant(slot) => {
                    slot.insert(products.len());
                    products.push(ProductView {
                        name: row.name,
                        size: row.size,
                        code: row.article,
                        quantity: row.quantity,
                    });
                }
            }
        }

        Ok(products)
    }
}
