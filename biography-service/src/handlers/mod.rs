//! HTTP handlers for the biography service.

pub mod biography;
pub mod health;
pub mod metrics;
