use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use claims_engine::config::AppConfig;
use claims_engine::error::AppError;
use claims_engine::profiles::ProfileRegistry;
use claims_engine::telemetry;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{load_registry, AppState};
use crate::routes::with_claims_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = match &config.profiles.profile_dir {
        Some(dir) => load_registry(dir)?,
        None => {
            warn!("APP_PROFILE_DIR not set; starting with an empty profile registry");
            Arc::new(ProfileRegistry::new())
        }
    };

    let app = with_claims_routes(registry)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "claims rule engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
