//! Repository Traits

use kernel::error::app_error::AppResult;
use kernel::id::{CartItemId, ProductId, UserId};

use crate::domain::entity::{
    cart::{CartItem, CartLine},
    product::Product,
};
use crate::domain::value_object::{price::Price, product_name::ProductName, quantity::Quantity};

/// Product catalog
#[trait_variant::make(ProductRepository: Send)]
pub trait LocalProductRepository {
    /// All products, oldest first
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>>;

    async fn create(&self, product: &Product) -> AppResult<()>;

    /// Replace name and price; `NotFound` if the product does not exist
    async fn update(&self, id: &ProductId, name: &ProductName, price: Price)
    -> AppResult<Product>;

    /// `NotFound` if the product does not exist. Cart lines cascade.
    async fn delete(&self, id: &ProductId) -> AppResult<()>;
}

/// Per-user cart rows
///
/// Every operation is scoped by `user_id`; an item id owned by someone else
/// behaves exactly like an unknown one.
#[trait_variant::make(CartRepository: Send)]
pub trait LocalCartRepository {
    async fn lines(&self, user_id: &UserId) -> AppResult<Vec<CartLine>>;

    /// Insert `item`, or add its quantity to the user's existing line for the
    /// same product. Returns the stored row.
    ///
    /// `NotFound` if the product vanished between check and insert.
    async fn add(&self, item: &CartItem) -> AppResult<CartItem>;

    /// `None` if the item does not exist or is not the user's
    async fn set_quantity(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> AppResult<Option<CartItem>>;

    /// `false` if the item does not exist or is not the user's
    async fn remove(&self, user_id: &UserId, item_id: &CartItemId) -> AppResult<bool>;

    async fn clear(&self, user_id: &UserId) -> AppResult<u64>;
}
