//! Cart persistence seam.
//!
//! Stores take the whole aggregate as their unit of read and write and
//! enforce the mutual-exclusion contract: every read-modify-write on a
//! given cart is serialized at the storage layer, so two concurrent adds
//! to the same owner's cart cannot lose an update.

pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::domain::Cart;
use crate::error::Result;

pub use memory::MemoryCartStore;
pub use postgres::PostgresCartStore;

pub trait CartStore: Send + Sync {
    /// Load the owner's cart without creating one. `Ok(None)` when the
    /// owner has never added anything.
    async fn load(&self, owner_id: Uuid) -> Result<Option<Cart>>;

    /// Atomically read-modify-write the owner's cart. With
    /// `create_missing`, an absent cart is created empty before `apply`
    /// runs (the first-add race is resolved by the storage layer's
    /// owner-uniqueness constraint); otherwise absence is `CartNotFound`.
    /// An `Err` from `apply` aborts the write and persists nothing.
    async fn update<F>(&self, owner_id: Uuid, create_missing: bool, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send;

    /// Atomically read-modify-write the cart containing the given item,
    /// whoever it belongs to. `ItemNotFound` when no cart holds the item.
    /// Ownership checks happen inside `apply`, which sees the full
    /// aggregate including its owner.
    async fn update_containing<F>(&self, item_id: Uuid, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send;
}
