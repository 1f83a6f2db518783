pub mod stock_repo;
pub use stock_repo::{StockRepository, StockStore};
pub mod seed;
pub use seed::SeedData;

#[cfg(test)]
pub mod memory_repo;
