//! HTTP Handlers

use std::str::FromStr;
use std::sync::Arc;

use auth::Principal;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{CartItemId, ProductId};

use crate::application::{CartUseCase, CatalogUseCase, ProductInput};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::presentation::dto::{
    AddCartItemRequest, CartItemResponse, CartResponse, MessageResponse, ProductRequest,
    ProductResponse, UpdateCartItemRequest,
};

/// Shared state for shop handlers
pub struct ShopAppState<R>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

impl<R> ShopAppState<R>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn catalog(&self) -> CatalogUseCase<R> {
        CatalogUseCase::new(self.repo.clone())
    }

    fn cart(&self) -> CartUseCase<R, R> {
        CartUseCase::new(self.repo.clone(), self.repo.clone())
    }
}

impl<R> Clone for ShopAppState<R>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

/// Unparseable ids name nothing
fn parse_id<T: FromStr>(raw: &str, not_found: &'static str) -> AppResult<T> {
    raw.parse().map_err(|_| AppError::not_found(not_found))
}

// ============================================================================
// Products (public)
// ============================================================================

/// GET /products
pub async fn list_products<R>(
    State(state): State<ShopAppState<R>>,
) -> AppResult<Json<Vec<ProductResponse>>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let products = state.catalog().list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// GET /products/{id}
pub async fn get_product<R>(
    State(state): State<ShopAppState<R>>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let id: ProductId = parse_id(&id, "Product not found")?;
    let product = state.catalog().get(&id).await?;
    Ok(Json(product.into()))
}

// ============================================================================
// Products (admin)
// ============================================================================

/// POST /admin/products
pub async fn create_product<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Json(req): Json<ProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let product = state
        .catalog()
        .create(
            &principal.id,
            ProductInput {
                name: req.name,
                price: req.price,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /admin/products/{id}
pub async fn update_product<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> AppResult<Json<ProductResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let id: ProductId = parse_id(&id, "Product not found")?;
    let product = state
        .catalog()
        .update(
            &principal.id,
            &id,
            ProductInput {
                name: req.name,
                price: req.price,
            },
        )
        .await?;

    Ok(Json(product.into()))
}

/// DELETE /admin/products/{id}
pub async fn delete_product<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let id: ProductId = parse_id(&id, "Product not found")?;
    state.catalog().delete(&principal.id, &id).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}

// ============================================================================
// Cart (access token required)
// ============================================================================

/// GET /cart
pub async fn view_cart<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
) -> AppResult<Json<CartResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let cart = state.cart().view(&principal.id).await?;
    Ok(Json(cart.into()))
}

/// POST /cart
pub async fn add_cart_item<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Json(req): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<CartItemResponse>)>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let product_id: ProductId = parse_id(&req.product_id, "Product not found")?;
    let item = state
        .cart()
        .add(&principal.id, &product_id, req.quantity.unwrap_or(1))
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /cart/{itemId}
pub async fn update_cart_item<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartItemResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let item_id: CartItemId = parse_id(&item_id, "Cart item not found")?;
    let item = state
        .cart()
        .update(&principal.id, &item_id, req.quantity)
        .await?;

    Ok(Json(item.into()))
}

/// DELETE /cart/{itemId}
pub async fn remove_cart_item<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
    Path(item_id): Path<String>,
) -> AppResult<Json<MessageResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    let item_id: CartItemId = parse_id(&item_id, "Cart item not found")?;
    state.cart().remove(&principal.id, &item_id).await?;

    Ok(Json(MessageResponse {
        message: "Item removed from cart",
    }))
}

/// DELETE /cart
pub async fn clear_cart<R>(
    State(state): State<ShopAppState<R>>,
    principal: Principal,
) -> AppResult<Json<MessageResponse>>
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    state.cart().clear(&principal.id).await?;

    Ok(Json(MessageResponse {
        message: "Cart cleared",
    }))
}
