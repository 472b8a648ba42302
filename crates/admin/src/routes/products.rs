//! Catalog management: listing, create, edit, delete, image upload.
//!
//! Product forms are multipart so an image file can ride along with the
//! text fields. The image is pushed to the external host first and only
//! its public URL is sent to the commerce API.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shutterbay_client::types::{Product, ProductInput};
use shutterbay_core::types::ProductId;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Products shown per listing page.
const PAGE_SIZE: usize = 20;

/// Storefront departments, offered as the category dropdown.
pub const CATEGORIES: [&str; 6] = [
    "Cameras",
    "Lenses",
    "Drones",
    "Lighting",
    "Audio",
    "Accessories",
];

// =============================================================================
// Views
// =============================================================================

/// One row of the catalog listing.
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub stock: u32,
    pub top_seller: bool,
    pub image: String,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.effective_price().display(),
            stock: product.stock,
            top_seller: product.top_seller,
            image: product.image.clone(),
        }
    }
}

/// Form state for the create/edit template.
///
/// Everything is pre-rendered as strings so the same template serves a
/// blank form, an edit form, and (on the API side) validation retries.
pub struct ProductFormView {
    pub id: Option<String>,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub discount: String,
    pub stock: String,
    pub description: String,
    pub image: String,
    /// Gallery URLs, one per line.
    pub images: String,
    pub top_seller: bool,
    /// Spec sheet rows as "Name: Value", one per line.
    pub specifications: String,
}

impl ProductFormView {
    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            brand: String::new(),
            category: String::new(),
            price: String::new(),
            discount: String::new(),
            stock: "0".to_string(),
            description: String::new(),
            image: String::new(),
            images: String::new(),
            top_seller: false,
            specifications: String::new(),
        }
    }
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        let specifications = product
            .specifications
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            id: Some(product.id.to_string()),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            discount: product
                .discount
                .map(|d| d.to_string())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            description: product.description.clone(),
            image: product.image.clone(),
            images: product.images.join("\n"),
            top_seller: product.top_seller,
            specifications,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductIndexTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub products: Vec<ProductRowView>,
    pub query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: usize,
    pub notice: Option<String>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub form: ProductFormView,
    pub categories: [&'static str; 6],
    pub error: Option<String>,
}

// =============================================================================
// Listing
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub notice: Option<String>,
}

/// Catalog listing with search and paging.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<IndexQuery>,
) -> Result<ProductIndexTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.admin_products().await;
    state.sessions().sync(&session, &api).await?;
    let mut products = result?;

    let needle = query.q.clone().unwrap_or_default();
    if !needle.is_empty() {
        let lower = needle.to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&lower)
                || p.brand.to_lowercase().contains(&lower)
                || p.category.to_lowercase().contains(&lower)
        });
    }

    let total_count = products.len();
    let total_pages = u32::try_from(total_count.div_ceil(PAGE_SIZE)).unwrap_or(1).max(1);
    let current_page = query.page.unwrap_or(1).clamp(1, total_pages);
    let offset = usize::try_from(current_page - 1).unwrap_or(0) * PAGE_SIZE;

    let rows = products
        .iter()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(ProductRowView::from)
        .collect();

    Ok(ProductIndexTemplate {
        current_admin: Some(admin),
        products: rows,
        query: needle,
        current_page,
        total_pages,
        total_count,
        notice: query.notice,
    })
}

// =============================================================================
// Create / Edit Forms
// =============================================================================

/// Blank product form.
pub async fn new_form(RequireAdmin(admin): RequireAdmin) -> ProductFormTemplate {
    ProductFormTemplate {
        current_admin: Some(admin),
        form: ProductFormView::blank(),
        categories: CATEGORIES,
        error: None,
    }
}

/// Edit form pre-filled from the catalog.
#[instrument(skip(state, session))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.admin_product(&ProductId::new(&id)).await;
    state.sessions().sync(&session, &api).await?;
    let product = result?;

    Ok(ProductFormTemplate {
        current_admin: Some(admin),
        form: ProductFormView::from(&product),
        categories: CATEGORIES,
        error: None,
    })
}

// =============================================================================
// Mutations
// =============================================================================

/// Create a product from the multipart form.
#[instrument(skip(state, session, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let input = build_input(&state, multipart).await?;

    let api = state.sessions().api_session(&session).await;
    let result = api.create_product(&input).await;
    state.sessions().sync(&session, &api).await?;
    result?;

    Ok(Redirect::to("/products?notice=created").into_response())
}

/// Update a product from the multipart form.
#[instrument(skip(state, session, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let input = build_input(&state, multipart).await?;

    let api = state.sessions().api_session(&session).await;
    let result = api.update_product(&ProductId::new(&id), &input).await;
    state.sessions().sync(&session, &api).await?;
    result?;

    Ok(Redirect::to("/products?notice=updated").into_response())
}

/// Delete a product.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let api = state.sessions().api_session(&session).await;
    let result = api.delete_product(&ProductId::new(&id)).await;
    state.sessions().sync(&session, &api).await?;
    result?;

    Ok(Redirect::to("/products?notice=deleted").into_response())
}

// =============================================================================
// Form Parsing
// =============================================================================

/// Collected text fields plus an optional image file.
#[derive(Default)]
struct RawProductForm {
    fields: BTreeMap<String, String>,
    image_file: Option<(String, Vec<u8>)>,
}

/// Drain the multipart stream into named fields and the image file.
async fn read_form(mut multipart: Multipart) -> Result<RawProductForm> {
    let mut raw = RawProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "image_file" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Upload failed: {e}")))?;
            if !bytes.is_empty() {
                raw.image_file = Some((file_name, bytes.to_vec()));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed field {name}: {e}")))?;
            raw.fields.insert(name, value);
        }
    }

    Ok(raw)
}

/// Build the API payload from the form, uploading a new image if one was
/// attached.
async fn build_input(state: &AppState, multipart: Multipart) -> Result<ProductInput> {
    let raw = read_form(multipart).await?;

    let mut input = parse_input(&raw.fields)?;

    if let Some((file_name, bytes)) = raw.image_file {
        let url = state.images().upload(&file_name, bytes).await?;
        input.image = url;
    }

    if input.image.is_empty() {
        return Err(AppError::BadRequest(
            "A product image is required".to_string(),
        ));
    }

    Ok(input)
}

/// Validate the text fields into a `ProductInput`.
fn parse_input(fields: &BTreeMap<String, String>) -> Result<ProductInput> {
    let text = |name: &str| fields.get(name).map(String::as_str).unwrap_or("").trim().to_owned();

    let name = text("name");
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let category = text("category");
    if !CATEGORIES.contains(&category.as_str()) {
        return Err(AppError::BadRequest(format!("Unknown category: {category}")));
    }

    let price: Decimal = text("price")
        .parse()
        .map_err(|_| AppError::BadRequest("Price must be a number".to_string()))?;
    if price <= Decimal::ZERO {
        return Err(AppError::BadRequest("Price must be positive".to_string()));
    }

    let discount_text = text("discount");
    let discount = if discount_text.is_empty() {
        None
    } else {
        let d: Decimal = discount_text
            .parse()
            .map_err(|_| AppError::BadRequest("Discount must be a number".to_string()))?;
        if d < Decimal::ZERO || d >= Decimal::ONE_HUNDRED {
            return Err(AppError::BadRequest(
                "Discount must be between 0 and 100".to_string(),
            ));
        }
        Some(d)
    };

    let stock: u32 = text("stock")
        .parse()
        .map_err(|_| AppError::BadRequest("Stock must be a whole number".to_string()))?;

    let images = text("images")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let specifications = parse_specifications(&text("specifications"));

    Ok(ProductInput {
        name,
        brand: text("brand"),
        category,
        price,
        discount,
        stock,
        description: text("description"),
        image: text("image"),
        images,
        top_seller: fields.contains_key("top_seller"),
        specifications,
    })
}

/// Parse "Name: Value" lines into spec sheet rows. Lines without a colon
/// are ignored.
fn parse_specifications(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.to_owned()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn valid_fields() -> BTreeMap<String, String> {
        fields(&[
            ("name", "EOS R6"),
            ("brand", "Canon"),
            ("category", "Cameras"),
            ("price", "2499.99"),
            ("stock", "12"),
            ("description", "Full-frame mirrorless"),
            ("image", "https://img.example/r6.jpg"),
            ("specifications", "Sensor: Full-frame\nMount: RF"),
        ])
    }

    #[test]
    fn test_parse_input_happy_path() {
        let input = parse_input(&valid_fields()).unwrap();
        assert_eq!(input.name, "EOS R6");
        assert_eq!(input.stock, 12);
        assert_eq!(input.specifications.len(), 2);
        assert!(!input.top_seller);
        assert!(input.discount.is_none());
    }

    #[test]
    fn test_parse_input_rejects_bad_category() {
        let mut f = valid_fields();
        f.insert("category".to_owned(), "Typewriters".to_owned());
        assert!(parse_input(&f).is_err());
    }

    #[test]
    fn test_parse_input_rejects_nonpositive_price() {
        let mut f = valid_fields();
        f.insert("price".to_owned(), "0".to_owned());
        assert!(parse_input(&f).is_err());
    }

    #[test]
    fn test_parse_input_discount_bounds() {
        let mut f = valid_fields();
        f.insert("discount".to_owned(), "100".to_owned());
        assert!(parse_input(&f).is_err());

        f.insert("discount".to_owned(), "15".to_owned());
        let input = parse_input(&f).unwrap();
        assert_eq!(input.discount.unwrap().to_string(), "15");
    }

    #[test]
    fn test_top_seller_checkbox_presence() {
        let mut f = valid_fields();
        f.insert("top_seller".to_owned(), "on".to_owned());
        assert!(parse_input(&f).unwrap().top_seller);
    }

    #[test]
    fn test_parse_specifications_ignores_junk_lines() {
        let specs = parse_specifications("Sensor: APS-C\nno colon here\n : empty name\nWeight: 500g");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs["Weight"], "500g");
    }
}
