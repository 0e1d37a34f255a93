//! Domain model: the cart aggregate and its line items.

pub mod cart;

pub use cart::{Cart, CartItem};
