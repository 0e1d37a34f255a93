//! Error taxonomy for the cart core.
//!
//! All operations surface one of these kinds. Storage-layer failures are
//! wrapped opaque rather than leaking driver detail to callers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("product not found")]
    ProductNotFound,

    #[error("cart not found")]
    CartNotFound,

    #[error("cart item not found")]
    ItemNotFound,

    /// Ownership mismatch on a mutating operation. Security-relevant;
    /// logged at warn level by the service before propagating.
    #[error("cart does not belong to the requesting user")]
    Forbidden,

    /// The product directory failed or was unreachable. Retryable by the
    /// caller; never retried internally.
    #[error("product service unavailable: {0}")]
    Upstream(String),

    /// Defensive invariant: a mutation would produce a non-positive or
    /// overflowing quantity. Carries the final quantity the mutation
    /// would have produced; aborts without persisting anything.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u64),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CartError>;
