//! Unified error handling for the cart engine.
//!
//! Cart operations never hand these to their callers; the store logs them
//! and reports a [`MutationOutcome`](crate::cart::MutationOutcome) instead.
//! Lower layers and the setup path (`CartEngine::from_config`) do return
//! them.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::remote::RemoteCartError;
use crate::storage::StorageError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// On-device storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart API failed.
    #[error("Remote cart error: {0}")]
    Remote(#[from] RemoteCartError),

    /// The catalog API failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Stored cart data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::from(RemoteCartError::Unauthorized);
        assert_eq!(err.to_string(), "Remote cart error: Unauthorized");

        let err = CartError::from(StorageError::QuotaExceeded {
            needed: 20,
            quota: 10,
        });
        assert_eq!(
            err.to_string(),
            "Storage error: storage quota exceeded: 20 bytes needed, 10 allowed"
        );
    }
}
