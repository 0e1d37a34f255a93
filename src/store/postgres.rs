//! Postgres-backed cart store.
//!
//! The mutual-exclusion contract is enforced here, not in process
//! memory: each read-modify-write runs in one transaction with the cart
//! row locked (`SELECT ... FOR UPDATE`), so it holds across service
//! instances. Carts carry a unique index on `owner_id`, which also
//! resolves the concurrent first-add race via `ON CONFLICT DO NOTHING`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Cart, CartItem};
use crate::error::{CartError, Result};
use crate::store::CartStore;

#[derive(Clone, Debug)]
pub struct PostgresCartStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_id: Uuid,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    price: Decimal,
    // BIGINT in the schema so the full u32 range round-trips.
    quantity: i64,
    subtotal: Decimal,
}

fn storage(e: sqlx::Error) -> CartError {
    CartError::Storage(e.to_string())
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(storage)?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CartError::Storage(e.to_string()))
    }

    async fn load_items(conn: &mut PgConnection, cart_id: Uuid) -> Result<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT id, product_id, product_name, price, quantity, subtotal \
             FROM cart_items WHERE cart_id = $1 ORDER BY position",
        )
        .bind(cart_id)
        .fetch_all(conn)
        .await
        .map_err(storage)?;

        Ok(rows
            .into_iter()
            .map(|r| CartItem {
                id: r.id,
                product_id: r.product_id,
                product_name: r.product_name,
                price: r.price,
                quantity: r.quantity as u32,
                subtotal: r.subtotal,
            })
            .collect())
    }

    async fn hydrate(conn: &mut PgConnection, row: CartRow) -> Result<Cart> {
        let items = Self::load_items(conn, row.id).await?;
        Ok(Cart::from_storage(
            row.id,
            row.owner_id,
            items,
            row.total,
            row.created_at,
            row.updated_at,
        ))
    }

    /// Write the whole aggregate back: the item set is replaced, the cart
    /// row updated. Runs inside the caller's transaction.
    async fn save(conn: &mut PgConnection, cart: &Cart) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart.id())
            .execute(&mut *conn)
            .await
            .map_err(storage)?;

        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                "INSERT INTO cart_items \
                 (id, cart_id, product_id, product_name, price, quantity, subtotal, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(item.id)
            .bind(cart.id())
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.price)
            .bind(i64::from(item.quantity))
            .bind(item.subtotal)
            .bind(position as i32)
            .execute(&mut *conn)
            .await
            .map_err(storage)?;
        }

        sqlx::query("UPDATE carts SET total = $2, updated_at = $3 WHERE id = $1")
            .bind(cart.id())
            .bind(cart.total())
            .bind(cart.updated_at())
            .execute(&mut *conn)
            .await
            .map_err(storage)?;

        Ok(())
    }
}

impl CartStore for PostgresCartStore {
    async fn load(&self, owner_id: Uuid) -> Result<Option<Cart>> {
        let mut conn = self.pool.acquire().await.map_err(storage)?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, total, created_at, updated_at \
             FROM carts WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => Ok(Some(Self::hydrate(&mut *conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn update<F>(&self, owner_id: Uuid, create_missing: bool, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        if create_missing {
            sqlx::query(
                "INSERT INTO carts (id, owner_id, total, created_at, updated_at) \
                 VALUES ($1, $2, 0, NOW(), NOW()) \
                 ON CONFLICT (owner_id) DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, total, created_at, updated_at \
             FROM carts WHERE owner_id = $1 FOR UPDATE",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or(CartError::CartNotFound)?;

        let mut cart = Self::hydrate(&mut *tx, row).await?;
        apply(&mut cart)?;

        Self::save(&mut *tx, &cart).await?;
        tx.commit().await.map_err(storage)?;
        Ok(cart)
    }

    async fn update_containing<F>(&self, item_id: Uuid, apply: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT c.id, c.owner_id, c.total, c.created_at, c.updated_at \
             FROM carts c JOIN cart_items i ON i.cart_id = c.id \
             WHERE i.id = $1 FOR UPDATE OF c",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or(CartError::ItemNotFound)?;

        let mut cart = Self::hydrate(&mut *tx, row).await?;
        apply(&mut cart)?;

        Self::save(&mut *tx, &cart).await?;
        tx.commit().await.map_err(storage)?;
        Ok(cart)
    }
}
