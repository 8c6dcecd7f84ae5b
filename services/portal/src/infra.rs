use admissions_portal::catalog::{CatalogError, CourseCatalog};
use admissions_portal::config::AppConfig;
use admissions_portal::workflows::token::Navigator;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<CourseCatalog>,
}

/// The configured catalog file, or the built-in programmes when none is set.
pub(crate) fn load_catalog(config: &AppConfig) -> Result<CourseCatalog, CatalogError> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = CourseCatalog::from_path(path)?;
            info!(path = %path.display(), courses = catalog.len(), "loaded course catalog");
            Ok(catalog)
        }
        None => Ok(CourseCatalog::standard()),
    }
}

/// Terminal stand-in for page navigation.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: &str) {
        info!(%destination, "navigating");
        println!("Returning to {destination}");
    }
}
