//! JSON client for the extraction endpoint.

use cutout_core::{ImagePayload, PayloadError};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_status, ExtractionService};
use crate::error::ServiceError;
use crate::model::{DetectedObject, Geometry};

#[derive(Serialize)]
struct ExtractRequestBody<'a> {
    image: String,
    #[serde(rename = "box")]
    bbox: &'a Geometry,
    mask: &'a Geometry,
}

#[derive(Deserialize)]
struct ExtractResponseBody {
    #[serde(default)]
    image: Option<String>,
}

/// Sends `{image, box, mask}` and reads back `{image}`, both images as
/// standard base64.
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    http: reqwest::Client,
    url: String,
}

impl HttpExtractionClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ExtractionService for HttpExtractionClient {
    async fn extract(
        &self,
        image: &ImagePayload,
        object: &DetectedObject,
    ) -> Result<ImagePayload, ServiceError> {
        info!(url = %self.url, label = %object.label, "Sending extraction request");

        let body = ExtractRequestBody {
            image: image.to_base64(),
            bbox: &object.bbox,
            mask: &object.mask,
        };
        let response = self.http.post(&self.url).json(&body).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;

        let parsed: ExtractResponseBody = serde_json::from_slice(&bytes).map_err(|e| {
            ServiceError::invalid_response(format!("extraction response is not an object: {e}"))
        })?;
        let encoded = parsed.image.ok_or(ServiceError::EmptyImage)?;

        let payload = ImagePayload::from_base64(&encoded).map_err(|e| match e {
            PayloadError::Blank => ServiceError::EmptyImage,
            PayloadError::InvalidBase64(msg) => ServiceError::InvalidResponse(msg),
        })?;

        info!(bytes = payload.len(), "Extraction complete");
        Ok(payload)
    }
}
