//! Remote services the workflow depends on.
//!
//! The controller only sees the two traits. The HTTP clients are the
//! production implementations; tests substitute in-memory fakes.

mod detect;
mod extract;

use std::future::Future;

use cutout_core::ImagePayload;

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::model::{DetectedObject, SelectedFile};

pub use detect::HttpDetectionClient;
pub use extract::HttpExtractionClient;

/// Proposes objects found in an uploaded image.
pub trait DetectionService {
    /// Detect objects in `file`. The list is returned in service order.
    fn detect(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<Vec<DetectedObject>, ServiceError>> + Send;
}

/// Cuts one detected object out of the image it was found in.
pub trait ExtractionService {
    /// Extract `object` from `image`. The result is never empty.
    fn extract(
        &self,
        image: &ImagePayload,
        object: &DetectedObject,
    ) -> impl Future<Output = Result<ImagePayload, ServiceError>> + Send;
}

/// Both HTTP clients sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    detection: HttpDetectionClient,
    extraction: HttpExtractionClient,
}

impl ServiceClient {
    pub fn new(detection: HttpDetectionClient, extraction: HttpExtractionClient) -> Self {
        Self {
            detection,
            extraction,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ServiceError> {
        let http = config.http_client()?;
        Ok(Self::new(
            HttpDetectionClient::new(http.clone(), config.detect_url.clone()),
            HttpExtractionClient::new(http, config.extract_url.clone()),
        ))
    }

    pub fn detection(&self) -> &HttpDetectionClient {
        &self.detection
    }

    pub fn extraction(&self) -> &HttpExtractionClient {
        &self.extraction
    }
}

impl DetectionService for ServiceClient {
    async fn detect(&self, file: &SelectedFile) -> Result<Vec<DetectedObject>, ServiceError> {
        self.detection.detect(file).await
    }
}

impl ExtractionService for ServiceClient {
    async fn extract(
        &self,
        image: &ImagePayload,
        object: &DetectedObject,
    ) -> Result<ImagePayload, ServiceError> {
        self.extraction.extract(image, object).await
    }
}

/// Turn a non-2xx response into [`ServiceError::Status`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}
