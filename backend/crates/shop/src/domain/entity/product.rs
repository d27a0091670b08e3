//! Product Entity

use chrono::{DateTime, Utc};
use kernel::id::ProductId;

use crate::domain::value_object::{price::Price, product_name::ProductName};

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: ProductName, price: Price) -> Self {
        let now = Utc::now();

        Self {
            id: ProductId::new(),
            name,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}
