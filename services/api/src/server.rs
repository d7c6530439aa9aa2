use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_dispatch_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sos_dispatch::config::AppConfig;
use sos_dispatch::dispatch::{DispatchError, DispatchService};
use sos_dispatch::error::AppError;
use sos_dispatch::overpass::OverpassClient;
use sos_dispatch::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let store = Arc::new(build_store(&config.store).map_err(DispatchError::from)?);
    let geodata = Arc::new(OverpassClient::new(&config.overpass)?);
    info!(
        endpoint = geodata.endpoint(),
        radius_meters = config.overpass.radius_meters,
        seeded = config.store.seed_demo_data,
        "dispatch backends initialised"
    );
    let dispatch_service = Arc::new(DispatchService::new(
        store,
        geodata,
        config.overpass.radius_meters,
    ));

    let app = with_dispatch_routes(dispatch_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "emergency dispatch api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
