//! Cart service orchestration.
//!
//! Wires the product directory and cart store together behind the four
//! operations callers see: add item, get cart, remove item, clear cart.
//! Collaborators are passed in at construction; there is no ambient
//! registry.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::Cart;
use crate::error::{CartError, Result};
use crate::product::ProductDirectory;
use crate::store::CartStore;

pub struct CartService<S, P> {
    store: S,
    products: P,
}

impl<S: CartStore, P: ProductDirectory> CartService<S, P> {
    pub fn new(store: S, products: P) -> Self {
        Self { store, products }
    }

    /// Add `quantity` of a product to the owner's cart, creating the cart
    /// on first use. The product is resolved first, so a failed lookup
    /// leaves no empty cart behind; the merge, subtotal, and total
    /// recomputation then run as one atomic unit against the store.
    pub async fn add_item(&self, owner_id: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }

        let product = self.products.fetch(product_id).await?;
        debug!(%product_id, price = %product.price, "resolved product for add");

        let cart = self
            .store
            .update(owner_id, true, |cart| cart.add_item(&product, quantity))
            .await?;

        info!(%owner_id, %product_id, quantity, total = %cart.total(), "item added to cart");
        Ok(cart)
    }

    /// Fetch the owner's cart. Reads never create a cart; an owner who
    /// has not added anything gets `CartNotFound`.
    pub async fn get_cart(&self, owner_id: Uuid) -> Result<Cart> {
        self.store
            .load(owner_id)
            .await?
            .ok_or(CartError::CartNotFound)
    }

    /// Remove a single item by its identifier. The item's cart must
    /// belong to `owner_id`; a mismatch is refused without deleting
    /// anything and logged as a security-relevant event.
    pub async fn remove_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<()> {
        let result = self
            .store
            .update_containing(item_id, |cart| {
                if cart.owner_id() != owner_id {
                    return Err(CartError::Forbidden);
                }
                cart.remove_item(item_id)
            })
            .await;

        match result {
            Ok(cart) => {
                info!(%owner_id, %item_id, total = %cart.total(), "item removed from cart");
                Ok(())
            }
            Err(CartError::Forbidden) => {
                warn!(%owner_id, %item_id, "ownership mismatch on cart item removal");
                Err(CartError::Forbidden)
            }
            Err(e) => Err(e),
        }
    }

    /// Empty the owner's cart. The cart record survives with zero items
    /// and a zero total; an owner without a cart gets `CartNotFound`.
    pub async fn clear_cart(&self, owner_id: Uuid) -> Result<()> {
        self.store
            .update(owner_id, false, |cart| {
                cart.clear();
                Ok(())
            })
            .await?;

        info!(%owner_id, "cart cleared");
        Ok(())
    }
}
