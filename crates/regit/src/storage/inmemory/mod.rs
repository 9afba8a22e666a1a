//! In-memory storage backend.
//!
//! Stores users in a HashMap and the message log in a Vec, both wrapped in
//! `Arc<RwLock<_>>`. Useful for tests and development where persistence is
//! not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use regit::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
