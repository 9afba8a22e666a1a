pub mod error;
pub mod health;
pub mod messages;
pub mod profile;
pub mod root;

pub use error::AppError;
