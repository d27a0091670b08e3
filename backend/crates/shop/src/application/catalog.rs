//! Catalog Use Case
//!
//! Public reads plus the admin-only writes. Role checks happen at the router.

use std::sync::Arc;

use kernel::error::app_error::{AppError, AppResult, OptionExt};
use kernel::id::{ProductId, UserId};

use crate::domain::entity::product::Product;
use crate::domain::repository::ProductRepository;
use crate::domain::value_object::{price::Price, product_name::ProductName};

/// Name and decimal price as received
pub struct ProductInput {
    pub name: String,
    pub price: Option<f64>,
}

impl ProductInput {
    fn validate(self) -> AppResult<(ProductName, Price)> {
        let name = ProductName::new(&self.name)?;
        let price = self
            .price
            .ok_or_else(|| AppError::bad_request("Price is required"))
            .and_then(Price::from_decimal)?;
        Ok((name, price))
    }
}

pub struct CatalogUseCase<P>
where
    P: ProductRepository,
{
    products: Arc<P>,
}

impl<P> CatalogUseCase<P>
where
    P: ProductRepository,
{
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.products.list().await
    }

    pub async fn get(&self, id: &ProductId) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product not found")
    }

    pub async fn create(&self, actor: &UserId, input: ProductInput) -> AppResult<Product> {
        let (name, price) = input.validate()?;
        let product = Product::new(name, price);
        self.products.create(&product).await?;

        tracing::info!(actor = %actor, product_id = %product.id, "Product created");

        Ok(product)
    }

    pub async fn update(
        &self,
        actor: &UserId,
        id: &ProductId,
        input: ProductInput,
    ) -> AppResult<Product> {
        let (name, price) = input.validate()?;
        let product = self.products.update(id, &name, price).await?;

        tracing::info!(actor = %actor, product_id = %id, "Product updated");

        Ok(product)
    }

    pub async fn delete(&self, actor: &UserId, id: &ProductId) -> AppResult<()> {
        self.products.delete(id).await?;
        tracing::info!(actor = %actor, product_id = %id, "Product deleted");
        Ok(())
    }
}
