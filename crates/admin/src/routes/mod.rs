//! Admin console route handlers.
//!
//! Route tree:
//!
//! ```text
//! GET  /                        dashboard (counts + revenue chart)
//! GET  /login                   sign-in page
//! POST /login                   sign in (admin role required)
//! POST /logout                  sign out
//! GET  /products                catalog listing with search and paging
//! GET  /products/new            blank product form
//! POST /products                create product (multipart, image upload)
//! GET  /products/{id}/edit      edit form
//! POST /products/{id}           update product (multipart, image upload)
//! POST /products/{id}/delete    delete product
//! GET  /orders                  order listing with search and paging
//! POST /orders/{id}/status      move an order to a new status
//! GET  /users                   registered user listing
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the complete console router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_form))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit_form))
        .route("/products/{id}/delete", post(products::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/users", get(users::index))
}
