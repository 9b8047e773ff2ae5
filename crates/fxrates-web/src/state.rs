use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fxrates_core::{DateBounds, GatePolicy, QuotaRule, RateGate, ResponseCache};
use fxrates_warehouse::{Warehouse, WarehouseConfig, MAX_DATE, MIN_DATE};

use crate::api;
use crate::config::Config;

/// Shared per-process services: the repository handle, the validated date
/// window, and the two explicit stores behind the middleware chain.
pub struct AppState {
    pub warehouse: Warehouse,
    pub bounds: DateBounds,
    pub gate: RateGate,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(
        warehouse: Warehouse,
        bounds: DateBounds,
        gate_policy: GatePolicy,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            warehouse,
            bounds,
            gate: RateGate::new(gate_policy),
            cache: ResponseCache::new(cache_ttl),
        }
    }
}

/// The service quota stack: global defaults plus the shared `"api"` scope,
/// with route-local windows on the two single-day routes.
pub fn service_gate_policy() -> GatePolicy {
    GatePolicy::service_default()
        .with_route_rule(api::RATE_ONE_DAY, QuotaRule::per_hour(4))
        .with_route_rule(api::SALE_ONE_DAY, QuotaRule::per_hour(4))
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let warehouse = Warehouse::connect(WarehouseConfig {
        url: config.database_url.clone(),
    })
    .await?;
    let bounds = DateBounds::new(MIN_DATE, MAX_DATE)?;

    Ok(Arc::new(AppState::new(
        warehouse,
        bounds,
        service_gate_policy(),
        config.cache_ttl,
    )))
}

/// Background sweep dropping expired cache entries and idle rate-gate
/// windows, so neither store grows with the set of clients ever seen.
pub fn start_maintenance_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            state.cache.clear_expired().await;
            state.gate.clear_idle();
        }
    });
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
