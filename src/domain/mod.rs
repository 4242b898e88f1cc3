// Domain module - Shared value types, configuration schema and errors
pub mod config;
pub mod endpoint;
pub mod error;

pub use endpoint::Endpoint;
pub use error::{LensError, LensResult};
