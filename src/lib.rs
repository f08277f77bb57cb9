//! Cisco Support data core
//!
//! This crate fetches and shapes Cisco device support metadata (product
//! information, EoX lifecycle dates, PSIRT security advisories, known bugs,
//! software suggestions, and service-contract coverage) through OAuth2
//! client-credentials calls to Cisco's public Support APIs. A host
//! application builds a [`domain::DeviceContext`], invokes
//! [`application::SupportDataService::fetch_support_data`], and renders the
//! [`presentation::SupportTabPayload`] produced by the adapter.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use config::Config;
pub use logging::init_tracing;
