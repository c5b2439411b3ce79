//! Storage abstraction for the good deeds service.
//!
//! Backend crates (e.g., deeds-store-sqlite) implement [`Store`] so the round
//! engine doesn't depend on any specific database engine or schema details.

use thiserror::Error;

mod store;
mod types;

pub use store::*;
pub use types::*;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        assert_eq!(StoreError::NotFound.to_string(), "not found");
        assert_eq!(StoreError::AlreadyExists.to_string(), "already exists");
        assert_eq!(StoreError::Conflict.to_string(), "conflict");

        let err = StoreError::Backend("disk full".to_string());
        assert!(err.to_string().contains("backend error"));
        assert!(err.to_string().contains("disk full"));
    }
}
