use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

use crate::age_estimator::AgeEstimator;
use crate::warp_helpers::with_age_estimator;

pub async fn health_check(estimator: Arc<dyn AgeEstimator>) -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "model_loaded": estimator.is_available(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn service_info() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "service": "Photo diary API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "estimate_age": "/api/estimate-age (POST)",
            "create_collage": "/api/create-collage (POST)"
        }
    })))
}

pub fn build_health_routes(
    estimator: Arc<dyn AgeEstimator>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_age_estimator(estimator))
        .and_then(health_check);

    let index = warp::path::end().and(warp::get()).and_then(service_info);

    health.or(index)
}
