//! Product image uploads to the third-party image host.
//!
//! The admin console never stores image bytes itself: uploads go straight
//! to the hosting service and only the returned public URL is saved on
//! the product. This is a separate API with its own key, so it gets its
//! own client rather than hanging off [`ApiSession`].
//!
//! [`ApiSession`]: crate::ApiSession

use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::ApiError;

/// Client for the image hosting service.
#[derive(Clone)]
pub struct ImageHost {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Deserialize)]
struct UploadData {
    url: String,
}

impl ImageHost {
    /// Create a client for the hosting service at `endpoint`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    /// Upload an image and return its public URL.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Image upload rejected");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: "image host rejected the upload".to_owned(),
            });
        }

        let body: UploadResponse = serde_json::from_str(&text)?;
        match body.data {
            Some(data) if body.success => Ok(data.url),
            _ => Err(ApiError::Server {
                status: status.as_u16(),
                message: "image host returned no URL".to_owned(),
            }),
        }
    }
}
