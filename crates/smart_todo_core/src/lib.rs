pub mod assistant;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod suggestions;
pub mod task_api;
pub mod task_store;

pub use error::AppError;
pub use task_api::TaskApi;
pub use task_store::TaskStore;
