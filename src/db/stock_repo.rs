// src/db/stock_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::seed::SeedData,
    models::warehouse::{ArticleSplit, StockRow, WarehouseProduct},
};

/// Acesso ao saldo por (armazém, artigo). É o único caminho que altera 'warehouse_products'.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Saldo do artigo em cada armazém disponível, na ordem de consumo.
    async fn get_availability(&self, article: &str) -> Result<Vec<WarehouseProduct>, AppError>;

    /// Linhas de saldo de um armazém disponível (sem agregação).
    async fn get_remaining_stock(&self, warehouse_uuid: Uuid) -> Result<Vec<StockRow>, AppError>;

    /// quantity -= count, reserved_quantity += count. Tudo ou nada.
    async fn apply_reservation(&self, plan: &[ArticleSplit]) -> Result<(), AppError>;

    /// reserved_quantity -= count; quantity não muda.
    async fn apply_release(&self, plan: &[ArticleSplit]) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Carga inicial de armazéns/produtos/saldos (bootstrap, fora do fluxo de alocação).
    pub async fn insert_test_data(&self, data: &SeedData) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for warehouse in &data.warehouses {
            sqlx::query(
                "INSERT INTO warehouses (uuid, name, is_available, created_at) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (uuid) DO NOTHING",
            )
            .bind(warehouse.uuid)
            .bind(&warehouse.name)
            .bind(warehouse.is_available)
            .bind(warehouse.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for product in &data.products {
            sqlx::query(
                "INSERT INTO products (uuid, name, size, article) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (uuid) DO NOTHING",
            )
            .bind(product.uuid)
            .bind(&product.name)
            .bind(&product.size)
            .bind(&product.article)
            .execute(&mut *tx)
            .await?;
        }

        for stock in &data.stock {
            sqlx::query(
                r#"
                INSERT INTO warehouse_products (warehouse_uuid, product_uuid, quantity, reserved_quantity)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (warehouse_uuid, product_uuid) DO NOTHING
                "#,
            )
            .bind(stock.warehouse_uuid)
            .bind(stock.product_uuid)
            .bind(stock.quantity)
            .bind(stock.reserved_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            warehouses = data.warehouses.len(),
            products = data.products.len(),
            "Dados de teste inseridos"
        );
        Ok(())
    }

    // UPDATE condicional de uma linha. Zero linhas afetadas => ConcurrentModification.
    async fn update_product_quantities(
        tx: &mut Transaction<'static, Postgres>,
        article: &str,
        warehouse_uuid: Uuid,
        quantity_delta: i64,
        reserved_delta: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE warehouse_products wp
            SET quantity = wp.quantity + $1,
                reserved_quantity = wp.reserved_quantity + $2
            FROM products p
            WHERE wp.product_uuid = p.uuid
              AND p.article = $3
              AND wp.warehouse_uuid = $4
            "#,
        )
        .bind(quantity_delta)
        .bind(reserved_delta)
        .bind(article)
        .bind(warehouse_uuid)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!(article, %warehouse_uuid, "Erro ao atualizar saldo: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConcurrentModification {
                article: article.to_string(),
                warehouse_uuid,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl StockStore for StockRepository {
    async fn get_availability(&self, article: &str) -> Result<Vec<WarehouseProduct>, AppError> {
        // A ordem (criação do armazém, depois uuid) fixa o desempate do split guloso.
        let rows = sqlx::query_as::<_, WarehouseProduct>(
            r#"
            SELECT wp.warehouse_uuid, wp.quantity, wp.reserved_quantity
            FROM warehouse_products wp
            INNER JOIN products p ON wp.product_uuid = p.uuid
            INNER JOIN warehouses w ON wp.warehouse_uuid = w.uuid
            WHERE p.article = $1 AND w.is_available = TRUE
            ORDER BY w.created_at ASC, w.uuid ASC
            "#,
        )
        .bind(article)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_remaining_stock(&self, warehouse_uuid: Uuid) -> Result<Vec<StockRow>, AppError> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT p.name, p.size, p.article, wp.quantity
            FROM warehouse_products wp
            INNER JOIN products p ON p.uuid = wp.product_uuid
            INNER JOIN warehouses w ON w.uuid = wp.warehouse_uuid
            WHERE wp.warehouse_uuid = $1 AND w.is_available = TRUE
            ORDER BY p.name ASC, p.article ASC
            "#,
        )
        .bind(warehouse_uuid)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn apply_reservation(&self, plan: &[ArticleSplit]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for split in plan {
            for entry in &split.warehouses {
                // Em caso de erro, o drop de `tx` faz o ROLLBACK.
                Self::update_product_quantities(
                    &mut tx,
                    &split.article,
                    entry.warehouse_uuid,
                    -entry.count,
                    entry.count,
                )
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply_release(&self, plan: &[ArticleSplit]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for split in plan {
            for entry in &split.warehouses {
                match Self::update_product_quantities(
                    &mut tx,
                    &split.article,
                    entry.warehouse_uuid,
                    0,
                    -entry.count,
                )
                .await
                {
                    Ok(()) => {}
                    // Linha sumiu: a liberação é tolerante, desfaz o lote inteiro e segue sem erro.
                    Err(AppError::ConcurrentModification { article, warehouse_uuid }) => {
                        tracing::warn!(
                            %article,
                            %warehouse_uuid,
                            "Liberação sem linha correspondente, lote desfeito"
                        );
                        tx.rollback().await?;
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
