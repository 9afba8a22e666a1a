//! Mock identity provider for development.
//!
//! Serves a fake authorization page whose form produces codes that
//! [`MockProvider`](crate::providers::MockProvider) can exchange.

mod server;
mod templates;

pub use server::MockIdpServer;
