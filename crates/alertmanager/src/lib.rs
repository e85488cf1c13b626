//! Alertmanager silence gateway.
//!
//! This crate provides:
//! - `SilenceGateway` trait: create, delete and list silences owned by a service
//! - Alertmanager API v2 request/response models
//! - `AlertmanagerClient`, the reqwest-backed gateway implementation

pub mod client;
pub mod models;
pub mod traits;

pub use client::AlertmanagerClient;
pub use traits::{ActiveSilence, GatewayError, Silence, SilenceGateway, SilenceId};
