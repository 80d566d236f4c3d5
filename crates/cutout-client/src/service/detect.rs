//! Multipart client for the detection endpoint.

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use super::{check_status, DetectionService};
use crate::error::ServiceError;
use crate::model::{DetectedObject, SelectedFile};

/// Uploads the selected file as form field `image` and reads back a JSON
/// array of detected objects.
#[derive(Debug, Clone)]
pub struct HttpDetectionClient {
    http: reqwest::Client,
    url: String,
}

impl HttpDetectionClient {
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

impl DetectionService for HttpDetectionClient {
    async fn detect(&self, file: &SelectedFile) -> Result<Vec<DetectedObject>, ServiceError> {
        info!(
            url = %self.url,
            file = %file.name,
            bytes = file.payload.len(),
            "Sending detection request"
        );

        let part = Part::bytes(file.payload.as_bytes().to_vec()).file_name(file.name.clone());
        let form = Form::new().part("image", part);

        let response = self.http.post(&self.url).multipart(form).send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;

        let objects: Vec<DetectedObject> = serde_json::from_slice(&body).map_err(|e| {
            ServiceError::invalid_response(format!("detection response is not a list of objects: {e}"))
        })?;

        for object in &objects {
            debug!(label = %object.label, score = object.score, "Detected object");
        }
        info!(count = objects.len(), "Detection complete");
        Ok(objects)
    }
}
