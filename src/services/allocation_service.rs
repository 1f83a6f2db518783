// src/services/allocation_service.rs

use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    common::error::AppError,
    db::StockStore,
    models::warehouse::{ArticleSplit, WarehouseCount, WarehouseProduct},
};

// De qual saldo a divisão consome: livre (reserva) ou reservado (liberação).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockPool {
    Free,
    Reserved,
}

impl StockPool {
    fn available(self, row: &WarehouseProduct) -> i64 {
        let amount = match self {
            StockPool::Free => row.quantity,
            StockPool::Reserved => row.reserved_quantity,
        };
        amount.max(0)
    }
}

/// Motor de alocação: divide a demanda de cada artigo entre os armazéns e
/// grava o resultado numa única transação.
///
/// Reservas e liberações passam por um único mutex do processo inteiro. Leitura do
/// saldo, cálculo e escrita acontecem sem intercalação, então duas chamadas nunca
/// enxergam o mesmo saldo antes do decremento.
///
/// O `timeout` limita a espera na fila e a leitura do saldo. Depois que a escrita
/// começa ela vai até o commit ou rollback, mesmo que quem chamou desista.
#[derive(Clone)]
pub struct AllocationService {
    store: Arc<dyn StockStore>,
    lock: Arc<Mutex<()>>,
    timeout: Duration,
}

impl AllocationService {
    pub fn new(store: Arc<dyn StockStore>, timeout: Duration) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    // --- RESERVE ---
    pub async fn reserve(&self, articles: &[String]) -> Result<(), AppError> {
        let demand = count_articles(articles);
        if demand.is_empty() {
            return Ok(());
        }

        let (guard, plan) = self
            .lock_and_plan(&demand, StockPool::Free)
            .await
            .inspect_err(|e| tracing::warn!("Reserva rejeitada: {}", e))?;

        let articles = plan.len();
        self.write(guard, plan, StockPool::Free).await?;
        tracing::info!(articles, "Reserva gravada");
        Ok(())
    }

    // --- RELEASE ---
    // Liberar mais do que está reservado não é erro: a chamada vira um no-op.
    pub async fn release(&self, articles: &[String]) -> Result<(), AppError> {
        let demand = count_articles(articles);
        if demand.is_empty() {
            return Ok(());
        }

        let (guard, plan) = match self.lock_and_plan(&demand, StockPool::Reserved).await {
            Ok(planned) => planned,
            Err(AppError::InsufficientStock { article }) => {
                tracing::warn!(%article, "Liberação acima do reservado, nada foi alterado");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let articles = plan.len();
        self.write(guard, plan, StockPool::Reserved).await?;
        tracing::info!(articles, "Liberação gravada");
        Ok(())
    }

    // Entra na seção crítica e planeja, tudo dentro de `timeout`.
    // Devolve o guard: a seção crítica continua até a escrita terminar.
    async fn lock_and_plan(
        &self,
        demand: &[(String, i64)],
        pool: StockPool,
    ) -> Result<(OwnedMutexGuard<()>, Vec<ArticleSplit>), AppError> {
        let planned = async {
            let guard = Arc::clone(&self.lock).lock_owned().await;
            let plan = self.plan(demand, pool).await?;
            Ok::<_, AppError>((guard, plan))
        };

        match tokio::time::timeout(self.timeout, planned).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(timeout = ?self.timeout, "Operação de estoque excedeu o tempo limite");
                Err(AppError::Timeout)
            }
        }
    }

    // A escrita roda numa task própria que segura o guard: se o handler for cancelado,
    // a transação ainda fecha antes da próxima chamada entrar.
    async fn write(
        &self,
        guard: OwnedMutexGuard<()>,
        plan: Vec<ArticleSplit>,
        pool: StockPool,
    ) -> Result<(), AppError> {
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            let _guard = guard;
            match pool {
                StockPool::Free => store.apply_reservation(&plan).await,
                StockPool::Reserved => store.apply_release(&plan).await,
            }
        });

        task.await
            .map_err(|e| AppError::InternalServerError(anyhow!("escrita de estoque interrompida: {e}")))?
    }

    // Planeja todos os artigos antes de qualquer escrita; um artigo sem saldo aborta o lote.
    async fn plan(&self, demand: &[(String, i64)], pool: StockPool) -> Result<Vec<ArticleSplit>, AppError> {
        let mut plan = Vec::with_capacity(demand.len());

        for (article, requested) in demand {
            let rows = self.store.get_availability(article).await?;
            let split = split_demand(article, *requested, &rows, pool)?;
            tracing::debug!(%article, requested, units = split.total(), warehouses = split.warehouses.len(), "Artigo planejado");
            plan.push(split);
        }

        Ok(plan)
    }
}

/// Agrupa artigos repetidos: cada repetição é uma unidade de demanda.
/// A ordem de saída é a da primeira aparição.
pub fn count_articles(articles: &[String]) -> Vec<(String, i64)> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(articles.len());
    let mut counts: Vec<(String, i64)> = Vec::new();

    for article in articles {
        match index.entry(article.as_str()) {
            Entry::Occupied(slot) => counts[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                slot.insert(counts.len());
                counts.push((article.clone(), 1));
            }
        }
    }

    counts
}

/// Divisão gulosa: consome os armazéns na ordem recebida até cobrir `requested`.
pub fn split_demand(
    article: &str,
    requested: i64,
    rows: &[WarehouseProduct],
    pool: StockPool,
) -> Result<ArticleSplit, AppError> {
    let mut remaining = requested;
    let mut warehouses = Vec::new();

    for row in rows {
        if remaining == 0 {
            break;
        }

        let take = pool.available(row).min(remaining);
        if take > 0 {
            warehouses.push(WarehouseCount {
                warehouse_uuid: row.warehouse_uuid,
                count: take,
            });
        }
        remaining -= take;
    }

    if remaining > 0 {
        return Err(AppError::InsufficientStock {
            article: article.to_string(),
        });
    }

    Ok(ArticleSplit {
        article: article.to_string(),
        warehouses,
    })
}
