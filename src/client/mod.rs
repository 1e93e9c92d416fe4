//! Sentino API client.
//!
//! This module provides the HTTP transport and the scorer built on it.

pub mod scorer;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use scorer::Scorer;
pub use transport::{HttpTransport, Transport, TransportConfig, DEFAULT_BASE_URL};
