//! Application layer: error taxonomy and support-data orchestration

pub mod errors;
pub mod services;

pub use errors::*;
pub use services::*;
