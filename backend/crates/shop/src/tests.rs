//! Crate tests over an in-memory store

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex, MutexGuard};

    use auth::AuthConfig;
    use auth::domain::entity::user::User;
    use auth::domain::repository::UserRepository;
    use auth::domain::value_object::{
        email::Email, user_name::UserName, user_password::RawPassword,
        user_password::UserPassword, user_role::UserRole,
    };
    use auth::{AuthError, AuthResult};
    use kernel::error::app_error::{AppError, AppResult};
    use kernel::id::{CartItemId, ProductId, UserId};

    use crate::domain::entity::{
        cart::{CartItem, CartLine},
        product::Product,
    };
    use crate::domain::repository::{CartRepository, ProductRepository};
    use crate::domain::value_object::{price::Price, product_name::ProductName, quantity::Quantity};

    #[derive(Default)]
    struct ShopState {
        products: Vec<Product>,
        items: Vec<CartItem>,
    }

    #[derive(Clone, Default)]
    pub(crate) struct MemoryShop {
        state: Arc<Mutex<ShopState>>,
    }

    impl MemoryShop {
        fn lock(&self) -> MutexGuard<'_, ShopState> {
            self.state.lock().unwrap()
        }
    }

    impl ProductRepository for MemoryShop {
        async fn list(&self) -> AppResult<Vec<Product>> {
            Ok(self.lock().products.clone())
        }

        async fn find_by_id(&self, id: &ProductId) -> AppResult<Option<Product>> {
            Ok(self.lock().products.iter().find(|p| &p.id == id).cloned())
        }

        async fn create(&self, product: &Product) -> AppResult<()> {
            self.lock().products.push(product.clone());
            Ok(())
        }

        async fn update(
            &self,
            id: &ProductId,
            name: &ProductName,
            price: Price,
        ) -> AppResult<Product> {
            let mut state = self.lock();
            let product = state
                .products
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| AppError::not_found("Product not found"))?;
            product.name = name.clone();
            product.price = price;
            Ok(product.clone())
        }

        async fn delete(&self, id: &ProductId) -> AppResult<()> {
            let mut state = self.lock();
            let before = state.products.len();
            state.products.retain(|p| &p.id != id);
            if state.products.len() == before {
                return Err(AppError::not_found("Product not found"));
            }
            state.items.retain(|i| &i.product_id != id);
            Ok(())
        }
    }

    impl CartRepository for MemoryShop {
        async fn lines(&self, user_id: &UserId) -> AppResult<Vec<CartLine>> {
            let state = self.lock();
            Ok(state
                .items
                .iter()
                .filter(|i| &i.user_id == user_id)
                .filter_map(|i| {
                    let product = state.products.iter().find(|p| p.id == i.product_id)?;
                    Some(CartLine {
                        item_id: i.id,
                        product_id: product.id,
                        name: product.name.as_str().to_string(),
                        unit_price: product.price,
                        quantity: i.quantity,
                    })
                })
                .collect())
        }

        async fn add(&self, item: &CartItem) -> AppResult<CartItem> {
            let mut state = self.lock();
            if let Some(existing) = state
                .items
                .iter_mut()
                .find(|i| i.user_id == item.user_id && i.product_id == item.product_id)
            {
                existing.quantity = existing.quantity.merge(item.quantity);
                return Ok(existing.clone());
            }
            state.items.push(item.clone());
            Ok(item.clone())
        }

        async fn set_quantity(
            &self,
            user_id: &UserId,
            item_id: &CartItemId,
            quantity: Quantity,
        ) -> AppResult<Option<CartItem>> {
            let mut state = self.lock();
            Ok(state
                .items
                .iter_mut()
                .find(|i| &i.id == item_id && &i.user_id == user_id)
                .map(|i| {
                    i.quantity = quantity;
                    i.clone()
                }))
        }

        async fn remove(&self, user_id: &UserId, item_id: &CartItemId) -> AppResult<bool> {
            let mut state = self.lock();
            let before = state.items.len();
            state
                .items
                .retain(|i| !(&i.id == item_id && &i.user_id == user_id));
            Ok(state.items.len() != before)
        }

        async fn clear(&self, user_id: &UserId) -> AppResult<u64> {
            let mut state = self.lock();
            let before = state.items.len();
            state.items.retain(|i| &i.user_id != user_id);
            Ok((before - state.items.len()) as u64)
        }
    }

    /// Just enough of a user store for the access gate
    #[derive(Clone, Default)]
    pub(crate) struct MemoryUsers {
        users: Arc<Mutex<Vec<User>>>,
    }

    impl MemoryUsers {
        pub(crate) fn add(&self, username: &str, role: UserRole) -> User {
            let password = RawPassword::new("pw123".to_string()).unwrap();
            let user = User::new(
                UserName::new(username).unwrap(),
                Email::new(format!("{username}@x.com")).unwrap(),
                UserPassword::hash_blocking(&password).unwrap(),
                role,
            );
            self.users.lock().unwrap().push(user.clone());
            user
        }

        fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
            self.users.lock().unwrap().iter().find(|&u| pred(u)).cloned()
        }
    }

    impl UserRepository for MemoryUsers {
        async fn create(&self, user: &User) -> AuthResult<()> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            Ok(self.find(|u| &u.user_id == user_id))
        }

        async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
            Ok(self.find(|u| &u.username == username))
        }

        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
            Ok(self.find(|u| &u.email == email))
        }

        async fn exists_by_username(&self, username: &UserName) -> AuthResult<bool> {
            Ok(self.find(|u| &u.username == username).is_some())
        }

        async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
            Ok(self.find(|u| &u.email == email).is_some())
        }

        async fn list(&self) -> AuthResult<Vec<User>> {
            Ok(self.users.lock().unwrap().clone())
        }

        async fn update_email(&self, _user_id: &UserId, _email: &Email) -> AuthResult<()> {
            Err(AuthError::UserNotFound)
        }

        async fn update_role(&self, _user_id: &UserId, _role: UserRole) -> AuthResult<()> {
            Err(AuthError::UserNotFound)
        }

        async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
            self.users.lock().unwrap().retain(|u| &u.user_id != user_id);
            Ok(())
        }

        async fn admin_exists(&self) -> AuthResult<bool> {
            Ok(self.find(User::is_admin).is_some())
        }

        async fn replace_password(
            &self,
            _user_id: &UserId,
            _password: &UserPassword,
        ) -> AuthResult<u64> {
            Ok(0)
        }
    }

    pub(crate) fn config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig::with_secret(
            b"shop-test-signing-secret-0123456789".to_vec(),
        ))
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use kernel::error::kind::ErrorKind;
    use kernel::id::{CartItemId, ProductId, UserId};

    use super::support::*;
    use crate::application::{CartUseCase, CatalogUseCase, ProductInput};

    fn input(name: &str, price: Option<f64>) -> ProductInput {
        ProductInput {
            name: name.into(),
            price,
        }
    }

    #[tokio::test]
    async fn test_catalog_crud() {
        let shop = Arc::new(MemoryShop::default());
        let catalog = CatalogUseCase::new(shop.clone());
        let admin = UserId::new();

        let tea = catalog.create(&admin, input(" Tea ", Some(4.5))).await.unwrap();
        assert_eq!(tea.name.as_str(), "Tea");
        assert_eq!(tea.price.cents(), 450);

        let updated = catalog
            .update(&admin, &tea.id, input("Green tea", Some(5.0)))
            .await
            .unwrap();
        assert_eq!(updated.price.cents(), 500);
        assert_eq!(catalog.get(&tea.id).await.unwrap().name.as_str(), "Green tea");

        let missing_price = catalog.create(&admin, input("Cake", None)).await.unwrap_err();
        assert_eq!(missing_price.kind(), ErrorKind::BadRequest);
        let negative = catalog.create(&admin, input("Cake", Some(-1.0))).await.unwrap_err();
        assert_eq!(negative.kind(), ErrorKind::BadRequest);
        let unnamed = catalog.create(&admin, input("  ", Some(1.0))).await.unwrap_err();
        assert_eq!(unnamed.kind(), ErrorKind::BadRequest);

        catalog.delete(&admin, &tea.id).await.unwrap();
        assert_eq!(
            catalog.get(&tea.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            catalog.delete(&admin, &tea.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_merges_lines_and_totals() {
        let shop = Arc::new(MemoryShop::default());
        let catalog = CatalogUseCase::new(shop.clone());
        let cart = CartUseCase::new(shop.clone(), shop.clone());
        let admin = UserId::new();
        let alice = UserId::new();

        let tea = catalog.create(&admin, input("Tea", Some(2.5))).await.unwrap();
        let cake = catalog.create(&admin, input("Cake", Some(10.0))).await.unwrap();

        let first = cart.add(&alice, &tea.id, 1).await.unwrap();
        let again = cart.add(&alice, &tea.id, 2).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.quantity.get(), 3);
        cart.add(&alice, &cake.id, 1).await.unwrap();

        let view = cart.view(&alice).await.unwrap();
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.total().cents(), 750 + 1000);

        assert!(cart.view(&UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_rejections() {
        let shop = Arc::new(MemoryShop::default());
        let catalog = CatalogUseCase::new(shop.clone());
        let cart = CartUseCase::new(shop.clone(), shop.clone());
        let alice = UserId::new();
        let bob = UserId::new();

        let tea = catalog
            .create(&UserId::new(), input("Tea", Some(2.5)))
            .await
            .unwrap();

        let missing = cart.add(&alice, &ProductId::new(), 1).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(missing.message(), "Product not found");

        let zero = cart.add(&alice, &tea.id, 0).await.unwrap_err();
        assert_eq!(zero.kind(), ErrorKind::BadRequest);

        let item = cart.add(&alice, &tea.id, 1).await.unwrap();

        // Bob cannot see or touch Alice's line.
        let foreign = cart.update(&bob, &item.id, 5).await.unwrap_err();
        assert_eq!(foreign.kind(), ErrorKind::NotFound);
        let foreign = cart.remove(&bob, &item.id).await.unwrap_err();
        assert_eq!(foreign.kind(), ErrorKind::NotFound);

        let bad_qty = cart.update(&alice, &item.id, 0).await.unwrap_err();
        assert_eq!(bad_qty.kind(), ErrorKind::BadRequest);

        assert_eq!(cart.update(&alice, &item.id, 4).await.unwrap().quantity.get(), 4);
        cart.remove(&alice, &item.id).await.unwrap();
        assert_eq!(
            cart.remove(&alice, &CartItemId::new()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_deleting_product_empties_cart_lines() {
        let shop = Arc::new(MemoryShop::default());
        let catalog = CatalogUseCase::new(shop.clone());
        let cart = CartUseCase::new(shop.clone(), shop.clone());
        let admin = UserId::new();
        let alice = UserId::new();

        let tea = catalog.create(&admin, input("Tea", Some(1.0))).await.unwrap();
        cart.add(&alice, &tea.id, 2).await.unwrap();
        catalog.delete(&admin, &tea.id).await.unwrap();

        assert!(cart.view(&alice).await.unwrap().is_empty());
        assert_eq!(cart.clear(&alice).await.unwrap(), 0);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::AccessGuard;
    use auth::application::token_service::issue_access_token;
    use auth::domain::value_object::user_role::UserRole;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::presentation::{ShopAppState, admin_products_router, cart_router, products_router};

    struct TestApp {
        router: Router,
        users: MemoryUsers,
    }

    impl TestApp {
        fn new() -> Self {
            let users = MemoryUsers::default();
            let config = config();
            let guard = AccessGuard::new(Arc::new(users.clone()), config);
            let state = ShopAppState::new(Arc::new(MemoryShop::default()));

            let router = Router::new()
                .nest("/products", products_router(state.clone()))
                .nest(
                    "/admin/products",
                    admin_products_router(state.clone(), guard.clone()),
                )
                .nest("/cart", cart_router(state, guard));

            Self { router, users }
        }

        fn token_for(&self, username: &str, role: UserRole) -> String {
            let user = self.users.add(username, role);
            issue_access_token(&config(), &user.user_id, user.role).unwrap()
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    #[tokio::test]
    async fn test_admin_product_routes() {
        let app = TestApp::new();
        let admin = app.token_for("root", UserRole::Admin);
        let user = app.token_for("alice", UserRole::User);
        let body = json!({"name": "Tea", "price": 4.5});

        let (status, _) = app
            .call(Method::POST, "/admin/products", None, Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .call(Method::POST, "/admin/products", Some(&user), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = app
            .call(Method::POST, "/admin/products", Some(&admin), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["price"], 4.5);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = app.call(Method::GET, "/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = app
            .call(
                Method::PUT,
                &format!("/admin/products/{id}"),
                Some(&admin),
                Some(json!({"name": "Green tea", "price": 5})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Green tea");

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/admin/products/{id}"),
                Some(&admin),
                Some(json!({"name": "Green tea", "price": -1})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(Method::DELETE, &format!("/admin/products/{id}"), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .call(Method::GET, &format!("/products/{id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Product not found");

        let (status, _) = app.call(Method::GET, "/products/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cart_routes() {
        let app = TestApp::new();
        let admin = app.token_for("root", UserRole::Admin);
        let alice = app.token_for("alice", UserRole::User);
        let bob = app.token_for("bob", UserRole::User);

        let (_, product) = app
            .call(
                Method::POST,
                "/admin/products",
                Some(&admin),
                Some(json!({"name": "Tea", "price": 2.5})),
            )
            .await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let (status, _) = app.call(Method::GET, "/cart", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, item) = app
            .call(
                Method::POST,
                "/cart",
                Some(&alice),
                Some(json!({"productId": product_id, "quantity": 2})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["quantity"], 2);
        let item_id = item["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call(
                Method::POST,
                "/cart",
                Some(&alice),
                Some(json!({"productId": product_id})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, cart) = app.call(Method::GET, "/cart", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["items"].as_array().unwrap().len(), 1);
        assert_eq!(cart["items"][0]["quantity"], 3);
        assert_eq!(cart["items"][0]["lineTotal"], 7.5);
        assert_eq!(cart["total"], 7.5);

        let (status, _) = app
            .call(
                Method::POST,
                "/cart",
                Some(&alice),
                Some(json!({"productId": kernel::id::ProductId::new().to_string()})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/cart/{item_id}"),
                Some(&bob),
                Some(json!({"quantity": 5})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/cart/{item_id}"),
                Some(&alice),
                Some(json!({"quantity": 0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) = app
            .call(
                Method::PUT,
                &format!("/cart/{item_id}"),
                Some(&alice),
                Some(json!({"quantity": 5})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["quantity"], 5);

        let (status, _) = app
            .call(Method::DELETE, &format!("/cart/{item_id}"), Some(&bob), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .call(Method::DELETE, &format!("/cart/{item_id}"), Some(&alice), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item removed from cart");

        let (status, cart) = app.call(Method::GET, "/cart", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["total"], 0.0);
    }
}
