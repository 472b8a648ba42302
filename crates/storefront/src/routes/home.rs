//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::products::{CATEGORIES, ProductCardView};
use crate::state::AppState;

/// Number of top sellers shown on the home page.
const TOP_SELLER_COUNT: usize = 8;

/// A department tile on the home page.
#[derive(Clone)]
pub struct CategoryTile {
    pub name: &'static str,
    pub url: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub top_sellers: Vec<ProductCardView>,
    pub categories: Vec<CategoryTile>,
}

/// Display the home page.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> HomeTemplate {
    let api = state.api().anonymous();

    // A failed fetch renders an empty section rather than an error page.
    let top_sellers = match api.top_sellers().await {
        Ok(products) => products
            .iter()
            .take(TOP_SELLER_COUNT)
            .map(ProductCardView::from)
            .collect(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to fetch top sellers");
            Vec::new()
        }
    };

    let categories = CATEGORIES
        .iter()
        .map(|name| CategoryTile {
            name,
            url: format!("/shop?category={name}"),
        })
        .collect();

    HomeTemplate {
        current_user: user,
        top_sellers,
        categories,
    }
}
