//! Shared Kernel - vocabulary every storefront crate agrees on
//!
//! - [`error`]: the unified [`error::app_error::AppError`] and its HTTP mapping
//! - [`id`]: typed UUID identifiers so a user id can never be passed as a product id
//!
//! Only things with one meaning across auth, catalog and cart belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
