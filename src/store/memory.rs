//! In-process cart store.
//!
//! Backs tests and single-node embedding. Mutations are serialized by a
//! process-wide async mutex, which satisfies the mutual-exclusion
//! contract only within one process; multi-instance deployments need
//! [`PostgresCartStore`](crate::store::PostgresCartStore).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Cart;
use crate::error::{CartError, Result};
use crate::store::CartStore;

#[derive(Clone, Debug, Default)]
pub struct MemoryCartStore {
    // keyed by owner id
    carts: Arc<Mutex<HashMap<Uuid, Cart>>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryCartStore {
    async fn load(&self, owner_id: Uuid) -> Result<Option<Cart>> {
        Ok(self.carts.lock().await.get(&owner_id).cloned())
    }

    async fn update<F>(&self, owner_id: Uuid, create_missing: bool, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send,
    {
        let mut carts = self.carts.lock().await;

        // Mutate a working copy so a failed apply persists nothing.
        let mut cart = match carts.get(&owner_id) {
            Some(cart) => cart.clone(),
            None if create_missing => Cart::new_for_owner(owner_id),
            None => return Err(CartError::CartNotFound),
        };

        apply(&mut cart)?;
        carts.insert(owner_id, cart.clone());
        Ok(cart)
    }

    async fn update_containing<F>(&self, item_id: Uuid, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send,
    {
        let mut carts = self.carts.lock().await;

        let owner_id = carts
            .values()
            .find(|c| c.items().iter().any(|i| i.id == item_id))
            .map(Cart::owner_id)
            .ok_or(CartError::ItemNotFound)?;

        let mut cart = carts
            .get(&owner_id)
            .cloned()
            .ok_or(CartError::ItemNotFound)?;

        apply(&mut cart)?;
        carts.insert(owner_id, cart.clone());
        Ok(cart)
    }
}
