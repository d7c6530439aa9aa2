use metrics_exporter_prometheus::PrometheusHandle;
use sos_dispatch::config::StoreConfig;
use sos_dispatch::dispatch::{MemoryStore, RepositoryError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store for the running process, seeded with the demo facilities and teams unless disabled.
pub(crate) fn build_store(config: &StoreConfig) -> Result<MemoryStore, RepositoryError> {
    if config.seed_demo_data {
        MemoryStore::seeded()
    } else {
        Ok(MemoryStore::new())
    }
}
