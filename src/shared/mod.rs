pub mod config;
pub mod error;

pub use config::{AppConfig, RollbackStrategy};
pub use error::{AppError, Result};
