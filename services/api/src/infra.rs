use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use claims_engine::config::AppConfig;
use claims_engine::error::AppError;
use claims_engine::profiles::{load_profile_dir, ProfileRegistry};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build a registry from a directory of YAML profiles. Per-file failures are
/// logged and skipped so one bad profile never blocks the rest.
pub(crate) fn load_registry(dir: &Path) -> Result<Arc<ProfileRegistry>, AppError> {
    let registry = ProfileRegistry::new();
    let report = load_profile_dir(&registry, dir)?;

    for (file, error) in &report.failures {
        warn!(%file, %error, "skipping payer profile");
    }
    info!(
        loaded = report.loaded.len(),
        skipped = report.failures.len(),
        dir = %dir.display(),
        "payer profiles loaded"
    );

    Ok(Arc::new(registry))
}

/// Resolve the profile directory for CLI subcommands: explicit flag first,
/// then the application configuration.
pub(crate) fn registry_from(
    flag: Option<&Path>,
    config: &AppConfig,
) -> Result<Arc<ProfileRegistry>, AppError> {
    match flag.or(config.profiles.profile_dir.as_deref()) {
        Some(dir) => load_registry(dir),
        None => {
            warn!("no profile directory configured; registry is empty");
            Ok(Arc::new(ProfileRegistry::new()))
        }
    }
}
