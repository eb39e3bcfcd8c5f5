use log::{error, info, warn};
use mimalloc::MiMalloc;
use std::net::{IpAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use photo_diary::age_estimator::{AgeEstimator, RemoteAgeEstimator, UnconfiguredAgeEstimator};
use photo_diary::collage::{CollageComposer, CollageSpec, FontSet, FontSource};
use photo_diary::config::Config;
use photo_diary::routes::build_routes;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let host: IpAddr = config.host.parse()?;
    let port = config.port;

    info!("Starting photo diary API on {}:{}", host, port);
    info!("Locale: {}", config.locale.as_str());
    info!("Max rows per collage: {}", config.max_rows);

    if !is_port_available(host, port) {
        error!(
            "Port {} is already in use. Stop the other instance or set PHOTO_DIARY_PORT.",
            port
        );
        return Err(format!("Port {} is already in use", port).into());
    }

    let (composer, estimator) = initialize_services(&config);
    let routes = build_routes(composer, estimator, config.max_body_bytes);

    info!(
        "Server started successfully, listening on http://{}:{}",
        host, port
    );

    warp::serve(routes).run((host, port)).await;

    Ok(())
}

fn is_port_available(host: IpAddr, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}

fn initialize_services(config: &Config) -> (Arc<CollageComposer>, Arc<dyn AgeEstimator>) {
    let fonts = FontSet::load(&config.fonts.bold_path, &config.fonts.regular_path);
    if fonts.regular_source() != FontSource::Preferred {
        warn!(
            "Preferred fonts unavailable ({}), collage text uses the built-in face",
            config.fonts.regular_path.display()
        );
    }

    let composer = CollageComposer::new(
        CollageSpec::default(),
        Arc::new(fonts),
        config.locale.labels(),
    )
    .with_max_rows(config.max_rows)
    .with_jpeg_quality(config.jpeg_quality);
    info!("Collage composer initialized");

    let estimator: Arc<dyn AgeEstimator> = match &config.age_model_url {
        Some(url) => {
            info!("Age estimation delegated to {}", url);
            Arc::new(RemoteAgeEstimator::new(
                url.clone(),
                Duration::from_secs(config.age_model_timeout_secs),
            ))
        }
        None => {
            warn!("PHOTO_DIARY_AGE_MODEL_URL not set, age estimation disabled");
            Arc::new(UnconfiguredAgeEstimator)
        }
    };

    (Arc::new(composer), estimator)
}
