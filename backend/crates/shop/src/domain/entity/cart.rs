//! Cart Entities
//!
//! A cart is the set of `carts` rows of one user, at most one row per
//! product. Reads join the product so each line carries its current price.

use chrono::{DateTime, Utc};
use kernel::id::{CartItemId, ProductId, UserId};

use crate::domain::value_object::{price::Price, quantity::Quantity};

/// One stored cart row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: CartItemId::new(),
            user_id,
            product_id,
            quantity,
            created_at: Utc::now(),
        }
    }
}

/// A cart row joined with its product
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: Quantity,
}

impl CartLine {
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
