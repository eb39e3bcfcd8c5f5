use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{error, info};
use std::sync::Arc;
use warp::{reject, Filter, Rejection, Reply};

use crate::collage::{CollageComposer, CollageInput};
use crate::collage_types::{CollageRequest, CollageResponse};
use crate::warp_helpers::{with_composer, CompositionError, ValidationError};

/// Compose a before/after collage and return it as a data URI
pub async fn create_collage(
    request: CollageRequest,
    composer: Arc<CollageComposer>,
) -> Result<impl Reply, Rejection> {
    let (rows, metadata, user_info) = request.into_parts();
    info!("Creating collage from {} photo rows", rows.len());

    let result = tokio::task::spawn_blocking(move || {
        let today = chrono::Local::now().date_naive();
        composer.compose(&CollageInput {
            rows: &rows,
            metadata: &metadata,
            user_info: &user_info,
            today,
        })
    })
    .await;

    match result {
        Ok(Ok(collage)) => {
            let data_uri = format!(
                "data:{};base64,{}",
                collage.mime_type(),
                STANDARD.encode(&collage.bytes)
            );
            Ok(warp::reply::json(&CollageResponse {
                success: true,
                collage: data_uri,
            }))
        }
        Ok(Err(e)) if e.is_client_error() => {
            info!("Rejected collage request: {}", e);
            Err(reject::custom(ValidationError {
                message: e.to_string(),
            }))
        }
        Ok(Err(e)) => {
            error!("Failed to create collage: {}", e);
            Err(reject::custom(CompositionError {
                message: format!("Failed to create collage: {}", e),
            }))
        }
        Err(e) => {
            error!("Collage task failed: {}", e);
            Err(reject::custom(CompositionError {
                message: "Failed to create collage".to_string(),
            }))
        }
    }
}

pub fn build_collage_routes(
    composer: Arc<CollageComposer>,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "create-collage")
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json())
        .and(with_composer(composer))
        .and_then(create_collage)
}
