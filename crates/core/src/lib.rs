//! Functional core for regit.
//!
//! Pure domain types, public views, and the repository/provider traits the
//! imperative shell implements. Nothing in this crate performs I/O.

#[cfg(feature = "auth")]
pub mod auth;
pub mod chat;
pub mod storage;
