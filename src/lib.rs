pub mod age_estimator;
pub mod collage;
pub mod collage_types;
pub mod config;
pub mod exif_reader;
pub mod handlers_age;
pub mod handlers_collage;
pub mod handlers_health;
pub mod image_normalizer;
pub mod routes;
pub mod warp_helpers;
