use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Rejected before any store access
    #[error("validation failed: {0}")]
    Validation(String),

    /// Markup result does not fit in a decimal
    #[error("markup overflows for plate {0}")]
    PriceOverflow(uuid::Uuid),

    /// Persistence fault, propagated unchanged after logging
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CatalogError::Validation(_))
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
