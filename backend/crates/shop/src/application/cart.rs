//! Cart Use Case

use std::sync::Arc;

use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{CartItemId, ProductId, UserId};

use crate::domain::entity::cart::{Cart, CartItem};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::quantity::Quantity;

pub struct CartUseCase<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    carts: Arc<C>,
    products: Arc<P>,
}

impl<C, P> CartUseCase<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    pub fn new(carts: Arc<C>, products: Arc<P>) -> Self {
        Self { carts, products }
    }

    pub async fn view(&self, user_id: &UserId) -> AppResult<Cart> {
        let lines = self.carts.lines(user_id).await?;
        Ok(Cart { lines })
    }

    /// Add `quantity` units; an existing line for the product grows instead
    /// of a second line appearing
    pub async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> AppResult<CartItem> {
        let quantity = Quantity::new(quantity)?;

        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(product_not_found());
        }

        let item = self
            .carts
            .add(&CartItem::new(*user_id, *product_id, quantity))
            .await?;

        tracing::debug!(user_id = %user_id, product_id = %product_id, "Cart item added");

        Ok(item)
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: i64,
    ) -> AppResult<CartItem> {
        let quantity = Quantity::new(quantity)?;
        self.carts
            .set_quantity(user_id, item_id, quantity)
            .await?
            .ok_or_else(item_not_found)
    }

    pub async fn remove(&self, user_id: &UserId, item_id: &CartItemId) -> AppResult<()> {
        if !self.carts.remove(user_id, item_id).await? {
            return Err(item_not_found());
        }
        Ok(())
    }

    pub async fn clear(&self, user_id: &UserId) -> AppResult<u64> {
        self.carts.clear(user_id).await
    }
}

pub(crate) fn product_not_found() -> AppError {
    AppError::not_found("Product not found")
}

fn item_not_found() -> AppError {
    AppError::not_found("Cart item not found")
}
