//! PostgreSQL Repository Implementations

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{CartItemId, ProductId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::application::cart::product_not_found;
use crate::domain::entity::{
    cart::{CartItem, CartLine},
    product::Product,
};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::{
    price::Price, product_name::ProductName, quantity::MAX_QUANTITY, quantity::Quantity,
};

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed catalog and cart repository
#[derive(Clone)]
pub struct PgShopRepository {
    pool: PgPool,
    store_timeout: Duration,
}

impl PgShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_timeout(pool, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(pool: PgPool, store_timeout: Duration) -> Self {
        Self {
            pool,
            store_timeout,
        }
    }

    async fn timed<T>(&self, fut: impl Future<Output = Result<T, sqlx::Error>>) -> AppResult<T> {
        self.timed_with(fut, AppError::from).await
    }

    /// Like `timed`, with a custom mapping for store errors
    async fn timed_with<T>(
        &self,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
        map_err: fn(sqlx::Error) -> AppError,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(map_err),
            Err(_) => {
                tracing::warn!(timeout = ?self.store_timeout, "Store call timed out");
                Err(AppError::service_unavailable("Service temporarily unavailable")
                    .with_action("Retry the request later"))
            }
        }
    }
}

/// A cart insert racing a product delete hits the foreign key
fn map_cart_insert_error(err: sqlx::Error) -> AppError {
    let fk_violation = matches!(
        &err,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
    );
    if fk_violation {
        product_not_found().with_source(err)
    } else {
        AppError::from(err)
    }
}

const PRODUCT_COLUMNS: &str = "id, name, price_cents, created_at, updated_at";
const CART_ITEM_COLUMNS: &str = "id, user_id, product_id, quantity, created_at";

// ============================================================================
// Product Repository Implementation
// ============================================================================

impl ProductRepository for PgShopRepository {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id");
        let rows = self
            .timed(sqlx::query_as::<_, ProductRow>(&sql).fetch_all(&self.pool))
            .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = self
            .timed(
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(ProductRow::into_product))
    }

    async fn create(&self, product: &Product) -> AppResult<()> {
        self.timed(
            sqlx::query(
                r#"
                INSERT INTO products (id, name, price_cents, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product.id.as_uuid())
            .bind(product.name.as_str())
            .bind(product.price.cents())
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        id: &ProductId,
        name: &ProductName,
        price: Price,
    ) -> AppResult<Product> {
        let sql = format!(
            "UPDATE products SET name = $2, price_cents = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = self
            .timed(
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(id.as_uuid())
                    .bind(name.as_str())
                    .bind(price.cents())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(ProductRow::into_product)
            .ok_or_else(product_not_found)
    }

    async fn delete(&self, id: &ProductId) -> AppResult<()> {
        let deleted = self
            .timed(
                sqlx::query("DELETE FROM products WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(product_not_found());
        }
        Ok(())
    }
}

// ============================================================================
// Cart Repository Implementation
// ============================================================================

impl CartRepository for PgShopRepository {
    async fn lines(&self, user_id: &UserId) -> AppResult<Vec<CartLine>> {
        let rows = self
            .timed(
                sqlx::query_as::<_, CartLineRow>(
                    r#"
                    SELECT c.id AS item_id,
                           p.id AS product_id,
                           p.name,
                           p.price_cents,
                           c.quantity
                    FROM carts c
                    JOIN products p ON c.product_id = p.id
                    WHERE c.user_id = $1
                    ORDER BY c.created_at, c.id
                    "#,
                )
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(CartLineRow::into_line).collect())
    }

    async fn add(&self, item: &CartItem) -> AppResult<CartItem> {
        let sql = format!(
            r#"
            INSERT INTO carts (id, user_id, product_id, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = LEAST(carts.quantity + EXCLUDED.quantity, $6)
            RETURNING {CART_ITEM_COLUMNS}
            "#
        );
        let row = self
            .timed_with(
                sqlx::query_as::<_, CartItemRow>(&sql)
                    .bind(item.id.as_uuid())
                    .bind(item.user_id.as_uuid())
                    .bind(item.product_id.as_uuid())
                    .bind(item.quantity.get())
                    .bind(item.created_at)
                    .bind(MAX_QUANTITY)
                    .fetch_one(&self.pool),
                map_cart_insert_error,
            )
            .await?;

        Ok(row.into_item())
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> AppResult<Option<CartItem>> {
        let sql = format!(
            "UPDATE carts SET quantity = $3 WHERE id = $1 AND user_id = $2 \
             RETURNING {CART_ITEM_COLUMNS}"
        );
        let row = self
            .timed(
                sqlx::query_as::<_, CartItemRow>(&sql)
                    .bind(item_id.as_uuid())
                    .bind(user_id.as_uuid())
                    .bind(quantity.get())
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(CartItemRow::into_item))
    }

    async fn remove(&self, user_id: &UserId, item_id: &CartItemId) -> AppResult<bool> {
        let deleted = self
            .timed(
                sqlx::query("DELETE FROM carts WHERE id = $1 AND user_id = $2")
                    .bind(item_id.as_uuid())
                    .bind(user_id.as_uuid())
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn clear(&self, user_id: &UserId) -> AppResult<u64> {
        let result = self
            .timed(
                sqlx::query("DELETE FROM carts WHERE user_id = $1")
                    .bind(user_id.as_uuid())
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: ProductId::from_uuid(self.id),
            name: ProductName::from_db(self.name),
            price: Price::from_db(self.price_cents),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl CartItemRow {
    fn into_item(self) -> CartItem {
        CartItem {
            id: CartItemId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            product_id: ProductId::from_uuid(self.product_id),
            quantity: Quantity::from_db(self.quantity),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    item_id: Uuid,
    product_id: Uuid,
    name: String,
    price_cents: i64,
    quantity: i32,
}

impl CartLineRow {
    fn into_line(self) -> CartLine {
        CartLine {
            item_id: CartItemId::from_uuid(self.item_id),
            product_id: ProductId::from_uuid(self.product_id),
            name: self.name,
            unit_price: Price::from_db(self.price_cents),
            quantity: Quantity::from_db(self.quantity),
        }
    }
}
