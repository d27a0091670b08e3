//! Shop Backend Module
//!
//! Product catalog and per-user carts, in the same layers as `auth`:
//! - `domain/` - Products, cart lines, price/quantity rules, repository traits
//! - `application/` - Catalog and cart use cases
//! - `infra/` - PostgreSQL repository
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Errors are plain `kernel::error::AppError`; authentication comes from the
//! `auth` access gate.

pub mod application;
pub mod domain;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use infra::PgShopRepository;
pub use presentation::{ShopAppState, admin_products_router, cart_router, products_router};
