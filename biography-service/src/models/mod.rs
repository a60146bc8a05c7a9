//! Request and response bodies of the relay.

pub mod biography;

pub use biography::{BiographyRequest, BiographyResponse};
