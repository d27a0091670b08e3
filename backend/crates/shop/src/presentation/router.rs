//! Shop Routers
//!
//! The gated routers take the auth crate's [`AccessGuard`], so cart and admin
//! routes see the same `Principal` as the account routes.

use auth::domain::repository::UserRepository;
use auth::domain::value_object::user_role::UserRole;
use auth::{AccessGuard, require_access_token, require_role};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::presentation::handlers::{self, ShopAppState};

/// Public catalog reads
pub fn products_router<R>(state: ShopAppState<R>) -> Router
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::list_products::<R>))
        .route("/{id}", get(handlers::get_product::<R>))
        .with_state(state)
}

/// Catalog writes, admin role only
pub fn admin_products_router<R, U>(state: ShopAppState<R>, guard: AccessGuard<U>) -> Router
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(handlers::create_product::<R>))
        .route(
            "/{id}",
            put(handlers::update_product::<R>).delete(handlers::delete_product::<R>),
        )
        .route_layer(middleware::from_fn_with_state(UserRole::Admin, require_role))
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_access_token::<U>,
        ))
        .with_state(state)
}

/// The caller's own cart
pub fn cart_router<R, U>(state: ShopAppState<R>, guard: AccessGuard<U>) -> Router
where
    R: ProductRepository + CartRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(handlers::view_cart::<R>)
                .post(handlers::add_cart_item::<R>)
                .delete(handlers::clear_cart::<R>),
        )
        .route(
            "/{item_id}",
            put(handlers::update_cart_item::<R>).delete(handlers::remove_cart_item::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_access_token::<U>,
        ))
        .with_state(state)
}
