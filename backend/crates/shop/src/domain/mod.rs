//! Domain Layer
//!
//! Catalog and cart entities, value objects, repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{
    cart::{Cart, CartItem, CartLine},
    product::Product,
};
pub use repository::{CartRepository, ProductRepository};
