//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ShopAppState;
pub use router::{admin_products_router, cart_router, products_router};
