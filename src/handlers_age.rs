use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::{reject, Filter, Rejection, Reply};

use crate::age_estimator::{AgeEstimationError, AgeEstimator};
use crate::image_normalizer::{decode_payload, NormalizeError};
use crate::warp_helpers::{
    with_age_estimator, CompositionError, ModelUnavailableError, NoFaceDetectedError,
    ValidationError,
};

#[derive(Debug, Deserialize)]
pub struct EstimateAgeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

fn decode_image(encoded: &str) -> Result<image::DynamicImage, NormalizeError> {
    let bytes = decode_payload(encoded)?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Estimate a person's age from a face photo via the configured model
pub async fn estimate_age(
    request: EstimateAgeRequest,
    estimator: Arc<dyn AgeEstimator>,
) -> Result<impl Reply, Rejection> {
    let Some(encoded) = request.image.filter(|i| !i.trim().is_empty()) else {
        return Err(reject::custom(ValidationError {
            message: "No image provided".to_string(),
        }));
    };

    let result = tokio::task::spawn_blocking(move || {
        let image = decode_image(&encoded).map_err(|e| {
            warn!("Failed to decode age estimation image: {}", e);
            reject::custom(ValidationError {
                message: format!("Invalid image: {}", e),
            })
        })?;
        Ok::<_, Rejection>(estimator.estimate_age(&image))
    })
    .await;

    let estimate = match result {
        Ok(estimate) => estimate?,
        Err(e) => {
            error!("Age estimation task failed: {}", e);
            return Err(reject::custom(CompositionError {
                message: "Age estimation failed".to_string(),
            }));
        }
    };

    match estimate {
        Ok(age) => {
            info!("Estimated age: {}", age);
            Ok(warp::reply::json(&json!({
                "success": true,
                "age": age,
                "status": "success"
            })))
        }
        Err(AgeEstimationError::NoFaceDetected) => Err(reject::custom(NoFaceDetectedError)),
        Err(AgeEstimationError::ModelUnavailable(reason)) => {
            warn!("Age model unavailable: {}", reason);
            Err(reject::custom(ModelUnavailableError {
                message: "Age model unavailable".to_string(),
            }))
        }
    }
}

pub fn build_age_routes(
    estimator: Arc<dyn AgeEstimator>,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "estimate-age")
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json())
        .and(with_age_estimator(estimator))
        .and_then(estimate_age)
}
