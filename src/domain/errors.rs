//! Domain error types

use thiserror::Error;

/// Errors raised by domain validation
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Invalid manufacturer pattern: {pattern}")]
    InvalidPattern { pattern: String },
}
