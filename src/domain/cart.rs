//! Cart aggregate.
//!
//! A `Cart` is scoped to a single owner and exclusively owns its line
//! items; it is loaded and saved as one unit. The total is recomputed
//! after every mutation, so `total == Σ items[i].subtotal` holds at every
//! observable point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CartError, Result};
use crate::product::ProductSnapshot;

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    id: Uuid,
    owner_id: Uuid,
    items: Vec<CartItem>,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One product line within a cart. `product_name` and `price` are copies
/// taken at add time; they do not track later changes to the product
/// directory until the same product is added again.
#[derive(Clone, Debug, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl CartItem {
    fn from_snapshot(product: &ProductSnapshot, quantity: u32) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_name: product.name.clone(),
            price: product.price,
            quantity,
            subtotal: Decimal::ZERO,
        };
        item.recalculate_subtotal();
        item
    }

    fn recalculate_subtotal(&mut self) {
        self.subtotal = self.price * Decimal::from(self.quantity);
    }
}

impl Cart {
    pub fn new_for_owner(owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            items: vec![],
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an aggregate from persisted state. Storage-internal.
    pub(crate) fn from_storage(
        id: Uuid,
        owner_id: Uuid,
        items: Vec<CartItem>,
        total: Decimal,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self { id, owner_id, items, total, created_at, updated_at }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn owner_id(&self) -> Uuid { self.owner_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn total(&self) -> Decimal { self.total }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Merge a product into the cart. If a line for the product already
    /// exists its snapshot is refreshed to the latest fetched name/price
    /// and the quantity added on; otherwise a new line is appended. A
    /// product never appears in more than one line.
    pub fn add_item(&mut self, product: &ProductSnapshot, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let merged = existing.quantity.checked_add(quantity).ok_or(
                CartError::InvalidQuantity(u64::from(existing.quantity) + u64::from(quantity)),
            )?;
            existing.product_name = product.name.clone();
            existing.price = product.price;
            existing.quantity = merged;
            existing.recalculate_subtotal();
        } else {
            self.items.push(CartItem::from_snapshot(product, quantity));
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.total = self.items.iter().map(|i| i.subtotal).sum();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, name: &str, price: Decimal) -> ProductSnapshot {
        ProductSnapshot { id, name: name.into(), price }
    }

    #[test]
    fn test_add_merges_same_product() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new_for_owner(Uuid::new_v4());
        cart.add_item(&snapshot(p1, "Widget", Decimal::new(10, 0)), 2).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Decimal::new(20, 0));

        cart.add_item(&snapshot(p1, "Widget", Decimal::new(10, 0)), 3).unwrap();
        assert_eq!(cart.item_count(), 1); // Merged
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[0].subtotal, Decimal::new(50, 0));
        assert_eq!(cart.total(), Decimal::new(50, 0));
    }

    #[test]
    fn test_readd_refreshes_snapshot() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new_for_owner(Uuid::new_v4());
        cart.add_item(&snapshot(p1, "Widget", Decimal::new(10, 0)), 1).unwrap();
        cart.add_item(&snapshot(p1, "Widget v2", Decimal::new(12, 0)), 1).unwrap();

        let item = &cart.items()[0];
        assert_eq!(item.product_name, "Widget v2");
        assert_eq!(item.price, Decimal::new(12, 0));
        assert_eq!(item.subtotal, Decimal::new(24, 0));
        assert_eq!(cart.total(), Decimal::new(24, 0));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = Cart::new_for_owner(Uuid::new_v4());
        let err = cart
            .add_item(&snapshot(Uuid::new_v4(), "Widget", Decimal::ONE), 0)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(0)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_overflow_rejected() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new_for_owner(Uuid::new_v4());
        cart.add_item(&snapshot(p1, "Widget", Decimal::ONE), u32::MAX).unwrap();

        let err = cart
            .add_item(&snapshot(p1, "Widget", Decimal::ONE), 1)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));

        // The line is untouched by the refused merge.
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert_eq!(cart.total(), Decimal::from(u32::MAX));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new_for_owner(Uuid::new_v4());
        cart.add_item(&snapshot(Uuid::new_v4(), "A", Decimal::new(10, 0)), 2).unwrap();
        cart.add_item(&snapshot(Uuid::new_v4(), "B", Decimal::new(5, 0)), 1).unwrap();
        assert_eq!(cart.total(), Decimal::new(25, 0));

        let first = cart.items()[0].id;
        cart.remove_item(first).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Decimal::new(5, 0));

        assert!(matches!(cart.remove_item(Uuid::new_v4()), Err(CartError::ItemNotFound)));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
