pub mod core;
pub mod ml_service;
pub mod mock;
pub mod observability;
pub mod persistence;
pub mod repositories;

pub use ml_service::MlServiceClient;
pub use repositories::InMemoryHistoryRepository;
