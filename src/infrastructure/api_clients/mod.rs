//! Clients for the Cisco Support APIs

pub mod cisco;
pub mod endpoints;
pub mod token;
pub mod traits;

use crate::application::errors::SupportError;

/// Classify a failed `send()`: timeouts get their own variant so the host
/// can tell them apart from connection failures.
pub(crate) fn classify_send_error(error: reqwest::Error, timeout_seconds: u64) -> SupportError {
    if error.is_timeout() {
        SupportError::Timeout {
            seconds: timeout_seconds,
        }
    } else {
        SupportError::Network(error)
    }
}
