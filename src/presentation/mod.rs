//! Presentation layer: view models and the device tab adapter

pub mod device_tab;
pub mod models;

pub use device_tab::{build_payload, build_payload_at, should_show_tab};
pub use models::*;
