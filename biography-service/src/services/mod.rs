pub mod biography;
pub mod providers;

pub use biography::{BiographyRelay, RelayError};
