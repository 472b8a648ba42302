//! Product listing and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shutterbay_client::types::Product;
use shutterbay_core::types::ProductId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// The fixed storefront departments.
pub const CATEGORIES: &[&str] = &[
    "Cameras",
    "Lenses",
    "Drones",
    "Lighting",
    "Audio",
    "Accessories",
];

/// Products per listing page.
const PAGE_SIZE: usize = 12;

/// Number of related products on the detail page.
const RELATED_COUNT: usize = 4;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    /// Effective price, pre-formatted.
    pub price: String,
    /// List price shown struck through when a discount applies.
    pub compare_at_price: Option<String>,
    pub image: String,
    pub rating: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let effective = product.effective_price();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: effective.display(),
            compare_at_price: product
                .discount
                .filter(|d| d.is_sign_positive() && !d.is_zero())
                .map(|_| product.list_price().display()),
            image: product.image.clone(),
            rating: product.rating.map(|r| format!("{r:.1}")),
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub images: Vec<String>,
    pub stock: u32,
    pub specifications: Vec<(String, String)>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            images: product.images.clone(),
            stock: product.stock,
            specifications: product
                .specifications
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<ProductCardView>,
    pub categories: &'static [&'static str],
    pub active_category: Option<String>,
    pub query: Option<String>,
    pub sort: String,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCardView>,
}

/// Sort a product list in place by the requested mode.
///
/// Unknown modes fall back to the API's ordering.
fn sort_products(products: &mut [Product], mode: &str) {
    match mode {
        "low-high" => products.sort_by(|a, b| {
            a.effective_price()
                .amount
                .cmp(&b.effective_price().amount)
        }),
        "high-low" => products.sort_by(|a, b| {
            b.effective_price()
                .amount
                .cmp(&a.effective_price().amount)
        }),
        "alpha" => products.sort_by(|a, b| a.name.cmp(&b.name)),
        "rating" => products.sort_by(|a, b| {
            b.rating
                .unwrap_or_default()
                .cmp(&a.rating.unwrap_or_default())
        }),
        _ => {}
    }
}

/// Display the product listing page.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let api = state.api().anonymous();

    let mut products: Vec<Product> = match (&query.q, &query.category) {
        (Some(q), _) if !q.trim().is_empty() => api.search_products(q.trim()).await?,
        (_, Some(category)) => api.products_by_category(category).await?.as_ref().clone(),
        _ => api.products().await?.as_ref().clone(),
    };

    let sort = query.sort.unwrap_or_default();
    sort_products(&mut products, &sort);

    let total_pages = u32::try_from(products.len().div_ceil(PAGE_SIZE).max(1)).unwrap_or(1);
    let current_page = query.page.unwrap_or(1).clamp(1, total_pages);
    let offset = usize::try_from(current_page - 1).unwrap_or(0) * PAGE_SIZE;

    let cards = products
        .iter()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(ProductCardView::from)
        .collect();

    Ok(ShopTemplate {
        current_user: user,
        products: cards,
        categories: CATEGORIES,
        active_category: query.category,
        query: query.q,
        sort,
        current_page,
        total_pages,
    })
}

/// Display the product detail page with related products.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let api = state.api().anonymous();
    let product_id = ProductId::new(id);

    let product = api.product(&product_id).await.map_err(|err| match err {
        shutterbay_client::ApiError::NotFound(_) => {
            AppError::NotFound(format!("product {product_id}"))
        }
        other => AppError::Api(other),
    })?;

    // Related products come from the same department, excluding the
    // product itself. A failed fetch just hides the section.
    let related_products = match api.products_by_category(&product.category).await {
        Ok(listing) => listing
            .iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_COUNT)
            .map(ProductCardView::from)
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to fetch related products");
            Vec::new()
        }
    };

    Ok(ProductShowTemplate {
        current_user: user,
        product: ProductDetailView::from(product.as_ref()),
        related_products,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;
    use std::collections::BTreeMap;

    fn product(id: &str, name: &str, category: &str, price: rust_decimal::Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            brand: "Canon".to_owned(),
            category: category.to_owned(),
            price,
            discount: None,
            stock: 3,
            description: String::new(),
            image: String::new(),
            images: Vec::new(),
            rating: None,
            top_seller: false,
            specifications: BTreeMap::new(),
        }
    }

    #[test]
    fn test_category_filter_keeps_only_matching_products() {
        let catalog = vec![
            product("a", "EOS R6", "Cameras", dec!(2499)),
            product("b", "RF 50mm", "Lenses", dec!(199)),
            product("c", "RF 85mm", "Lenses", dec!(599)),
            product("d", "Mavic", "Drones", dec!(999)),
            product("e", "Key light", "Lighting", dec!(149)),
        ];

        let lenses: Vec<_> = catalog.iter().filter(|p| p.category == "Lenses").collect();
        assert_eq!(lenses.len(), 2);
    }

    #[test]
    fn test_sort_low_high_uses_discounted_price() {
        let mut cheap_after_discount = product("a", "EOS R6", "Cameras", dec!(1000));
        cheap_after_discount.discount = Some(dec!(50));
        let mut products = vec![
            cheap_after_discount,
            product("b", "RF 50mm", "Lenses", dec!(600)),
        ];

        sort_products(&mut products, "low-high");
        // 1000 at 50% off sorts below the undiscounted 600.
        assert_eq!(products[0].id, ProductId::new("a"));
    }

    #[test]
    fn test_sort_alpha_orders_by_name() {
        let mut products = vec![
            product("a", "Zoom H5", "Audio", dec!(250)),
            product("b", "Aputure 120d", "Lighting", dec!(700)),
        ];

        sort_products(&mut products, "alpha");
        assert_eq!(products[0].name, "Aputure 120d");
    }

    #[test]
    fn test_unknown_sort_mode_keeps_api_order() {
        let mut products = vec![
            product("b", "RF 50mm", "Lenses", dec!(600)),
            product("a", "EOS R6", "Cameras", dec!(100)),
        ];

        sort_products(&mut products, "newest");
        assert_eq!(products[0].id, ProductId::new("b"));
    }

    #[test]
    fn test_card_shows_compare_at_price_only_when_discounted() {
        let plain = product("a", "EOS R6", "Cameras", dec!(2499));
        assert!(ProductCardView::from(&plain).compare_at_price.is_none());

        let mut discounted = plain.clone();
        discounted.discount = Some(dec!(10));
        let card = ProductCardView::from(&discounted);
        assert_eq!(card.compare_at_price.unwrap(), "$2499.00");
        assert_eq!(card.price, "$2249.10");
    }

    #[test]
    fn test_zero_stock_card_is_out_of_stock() {
        let mut gone = product("a", "EOS R6", "Cameras", dec!(2499));
        gone.stock = 0;
        assert!(!ProductCardView::from(&gone).in_stock);
    }
}
