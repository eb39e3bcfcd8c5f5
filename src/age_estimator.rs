use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AgeEstimationError {
    #[error("No face detected")]
    NoFaceDetected,
    #[error("Age model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Face-analysis collaborator. Implementations are created once at startup
/// and shared read-only between request handlers.
pub trait AgeEstimator: Send + Sync {
    fn estimate_age(&self, image: &DynamicImage) -> Result<u32, AgeEstimationError>;

    /// Whether a model is configured and expected to answer
    fn is_available(&self) -> bool;
}

/// Used when no model service is configured
pub struct UnconfiguredAgeEstimator;

impl AgeEstimator for UnconfiguredAgeEstimator {
    fn estimate_age(&self, _image: &DynamicImage) -> Result<u32, AgeEstimationError> {
        Err(AgeEstimationError::ModelUnavailable(
            "no age model configured".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
struct RemoteAgeRequest {
    image: String,
}

#[derive(Debug, Deserialize)]
struct RemoteAgeResponse {
    age: Option<f64>,
}

/// Delegates to a face-analysis service speaking `{ image } -> { age }`
pub struct RemoteAgeEstimator {
    endpoint: String,
    agent: ureq::Agent,
}

impl RemoteAgeEstimator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    fn encode(image: &DynamicImage) -> Result<String, AgeEstimationError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 90)
            .encode_image(&image.to_rgb8())
            .map_err(|e| AgeEstimationError::ModelUnavailable(format!("encode failed: {}", e)))?;
        Ok(STANDARD.encode(bytes))
    }
}

impl AgeEstimator for RemoteAgeEstimator {
    fn estimate_age(&self, image: &DynamicImage) -> Result<u32, AgeEstimationError> {
        let request = RemoteAgeRequest {
            image: Self::encode(image)?,
        };

        let mut response = match self.agent.post(self.endpoint.as_str()).send_json(&request) {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(422)) => return Err(AgeEstimationError::NoFaceDetected),
            Err(e) => {
                warn!("Age model request to {} failed: {}", self.endpoint, e);
                return Err(AgeEstimationError::ModelUnavailable(e.to_string()));
            }
        };

        let body: RemoteAgeResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| AgeEstimationError::ModelUnavailable(format!("bad response: {}", e)))?;

        debug!("Age model answered {:?}", body.age);
        interpret_age(body.age)
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn interpret_age(age: Option<f64>) -> Result<u32, AgeEstimationError> {
    match age {
        Some(age) if age.is_finite() && age >= 0.0 => Ok(age.round() as u32),
        _ => Err(AgeEstimationError::NoFaceDetected),
    }
}
