//! Value Object Module

pub mod price;
pub mod product_name;
pub mod quantity;
