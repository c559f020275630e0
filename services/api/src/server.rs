use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLootStore};
use crate::routes::with_loot_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use guild_loot::config::AppConfig;
use guild_loot::error::AppError;
use guild_loot::telemetry;
use guild_loot::workflows::loot::LootPriorityService;
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

    let store = Arc::new(InMemoryLootStore::seeded_guild());
    let loot_service = Arc::new(LootPriorityService::new(store, config.loot.clone()));

    let app = with_loot_routes(loot_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        priority_limit = config.loot.priority_limit,
        "loot priority service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
