//! Owner-scoped shopping cart core.
//!
//! Each user owns at most one cart, a list of product line items with a
//! derived total. Adding a product resolves its current name and price
//! from the product service, merges into an existing line or appends a
//! new one, and recomputes subtotals and the cart total as one atomic
//! unit against the store.
//!
//! ## Structure
//! - [`domain`] - the cart aggregate and its invariants
//! - [`product`] - product lookup over HTTP
//! - [`store`] - persistence seam (Postgres, in-memory)
//! - [`service`] - the add/get/remove/clear orchestration
//!
//! Collaborators are wired explicitly:
//!
//! ```no_run
//! use cart_service::{CartService, Config, HttpProductDirectory, PostgresCartStore};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let store = PostgresCartStore::connect(&config).await?;
//! store.migrate().await?;
//! let products = HttpProductDirectory::new(&config.product_service_url);
//! let service = CartService::new(store, products);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod product;
pub mod service;
pub mod store;

pub use config::{Config, ConfigError};
pub use domain::{Cart, CartItem};
pub use error::{CartError, Result};
pub use product::{HttpProductDirectory, ProductDirectory, ProductSnapshot};
pub use service::CartService;
pub use store::{CartStore, MemoryCartStore, PostgresCartStore};

/// Install the global tracing subscriber, honoring `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
