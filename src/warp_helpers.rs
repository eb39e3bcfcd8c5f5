use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

use warp::{reject, Filter, Rejection, Reply};

use crate::age_estimator::AgeEstimator;
use crate::collage::CollageComposer;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: String,
}

/// Malformed or unusable request (empty rows, undecodable image, ...)
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl reject::Reject for ValidationError {}

/// Rendering or encoding failed after the request was accepted
#[derive(Debug)]
pub struct CompositionError {
    pub message: String,
}

impl reject::Reject for CompositionError {}

#[derive(Debug)]
pub struct NoFaceDetectedError;

impl reject::Reject for NoFaceDetectedError {}

#[derive(Debug)]
pub struct ModelUnavailableError {
    pub message: String,
}

impl reject::Reject for ModelUnavailableError {}

pub fn with_composer(
    composer: Arc<CollageComposer>,
) -> impl Filter<Extract = (Arc<CollageComposer>,), Error = Infallible> + Clone {
    warp::any().map(move || composer.clone())
}

pub fn with_age_estimator(
    estimator: Arc<dyn AgeEstimator>,
) -> impl Filter<Extract = (Arc<dyn AgeEstimator>,), Error = Infallible> + Clone {
    warp::any().map(move || estimator.clone())
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;
    let timestamp = chrono::Utc::now().to_rfc3339();

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(validation_error) = err.find::<ValidationError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = validation_error.message.clone();
    } else if let Some(composition_error) = err.find::<CompositionError>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = composition_error.message.clone();
    } else if err.find::<NoFaceDetectedError>().is_some() {
        code = warp::http::StatusCode::UNPROCESSABLE_ENTITY;
        message = "No face detected".to_string();
    } else if let Some(model_error) = err.find::<ModelUnavailableError>() {
        code = warp::http::StatusCode::SERVICE_UNAVAILABLE;
        message = model_error.message.clone();
    } else if let Some(body_error) = err.find::<warp::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", body_error);
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = warp::http::StatusCode::LENGTH_REQUIRED;
        message = "Content-Length required".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = warp::http::StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Unsupported media type".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error".to_string();
    }

    let error_response = ErrorResponse {
        error: message,
        code: code.as_u16(),
        timestamp,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&error_response),
        code,
    ))
}

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
}
