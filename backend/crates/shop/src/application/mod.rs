//! Application Layer

pub mod cart;
pub mod catalog;

pub use cart::CartUseCase;
pub use catalog::{CatalogUseCase, ProductInput};
