//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Shop
//! GET  /shop                   - Product listing (category/search/sort via query)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count fragment)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Shipping form
//! POST /checkout               - Create hosted payment session, redirect
//! GET  /checkout/success       - Verify payment after provider redirect
//! GET  /checkout/cancel        - Payment cancelled page
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action
//! GET  /verify/{token}         - Email verification callback
//! GET  /forgot-password        - Forgot password page
//! POST /forgot-password        - Request reset email
//! GET  /reset-password/{token} - Reset password page
//! POST /reset-password/{token} - Reset password action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//! GET  /account/orders         - Order history
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/verify/{token}", get(auth::verify_email))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password/{token}",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::form).post(checkout::create_session))
        .route("/success", get(checkout::success))
        .route("/cancel", get(checkout::cancel))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/shop", get(products::index))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .merge(auth_routes())
}
