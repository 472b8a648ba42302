//! Product catalog endpoints with response caching.
//!
//! Catalog reads are the hottest path in the storefront and the data
//! changes rarely, so listings and product detail responses are cached
//! for five minutes keyed by endpoint. Search bypasses the cache; admin
//! product mutations invalidate it wholesale.

use std::sync::Arc;

use serde::Deserialize;
use shutterbay_core::types::ProductId;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::http::ApiSession;
use crate::types::Product;

/// A cached catalog response.
#[derive(Clone)]
pub(crate) enum CacheEntry {
    Product(Arc<Product>),
    Products(Arc<Vec<Product>>),
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

/// Percent-encode a value for use as a path segment.
///
/// `form_urlencoded` writes spaces as `+`, which a path segment takes
/// literally, so those become `%20`.
fn encode_path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl ApiSession {
    /// The full product listing.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_listing("products:all", "/products").await
    }

    /// Products in one storefront department.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category: &str,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_listing(
            &format!("products:category:{category}"),
            &format!("/products/category/{}", encode_path_segment(category)),
        )
        .await
    }

    /// Products flagged as top sellers.
    #[instrument(skip(self))]
    pub async fn top_sellers(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_listing("products:top", "/products/top").await
    }

    /// A single product by ID.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Arc<Product>, ApiError> {
        let cache = self.client().catalog_cache();
        let key = format!("product:{id}");

        if let Some(CacheEntry::Product(product)) = cache.get(&key).await {
            debug!(%id, "Catalog cache hit");
            return Ok(product);
        }

        let product: Product = self.get(&format!("/products/{id}")).await?;
        let product = Arc::new(product);
        cache
            .insert(key, CacheEntry::Product(Arc::clone(&product)))
            .await;
        Ok(product)
    }

    /// Search the catalog by name or brand. Never cached.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let body: SearchResponse = self.get(&format!("/products/search?q={encoded}")).await?;
        Ok(body.products)
    }

    async fn cached_listing(&self, key: &str, path: &str) -> Result<Arc<Vec<Product>>, ApiError> {
        let cache = self.client().catalog_cache();

        if let Some(CacheEntry::Products(products)) = cache.get(key).await {
            debug!(key, "Catalog cache hit");
            return Ok(products);
        }

        let products: Vec<Product> = self.get(path).await?;
        let products = Arc::new(products);
        cache
            .insert(key.to_owned(), CacheEntry::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment_escapes_reserved_characters() {
        assert_eq!(encode_path_segment("Cameras"), "Cameras");
        assert_eq!(encode_path_segment("Open Box"), "Open%20Box");
        assert_eq!(encode_path_segment("A/V Gear"), "A%2FV%20Gear");
    }
}
