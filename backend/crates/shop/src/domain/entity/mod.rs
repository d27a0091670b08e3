//! Entities

pub mod cart;
pub mod product;
