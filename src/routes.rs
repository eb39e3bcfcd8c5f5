use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

use crate::age_estimator::AgeEstimator;
use crate::collage::CollageComposer;
use crate::handlers_age::build_age_routes;
use crate::handlers_collage::build_collage_routes;
use crate::handlers_health::build_health_routes;
use crate::warp_helpers::{cors, handle_rejection};

/// Every route of the service, with CORS, access logging and JSON errors
pub fn build_routes(
    composer: Arc<CollageComposer>,
    estimator: Arc<dyn AgeEstimator>,
    max_body_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_routes = build_health_routes(estimator.clone());
    let collage_routes = build_collage_routes(composer, max_body_bytes);
    let age_routes = build_age_routes(estimator, max_body_bytes);

    health_routes
        .or(collage_routes)
        .or(age_routes)
        .with(cors())
        .with(warp::log("photo_diary"))
        .recover(handle_rejection)
}
