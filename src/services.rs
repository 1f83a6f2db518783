pub mod allocation_service;
pub use allocation_service::AllocationService;
pub mod catalog_service;
pub use catalog_service::CatalogService;
