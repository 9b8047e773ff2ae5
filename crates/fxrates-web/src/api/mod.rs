use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{cache_gate, rate_limit_gate};
use crate::state::AppState;

mod rates;
mod sales;

pub const RATE_ONE_DAY: &str = "/exchange-rates/USD/:date";
pub const RATE_RANGE: &str = "/exchange-rates/USD/:start/:end";
pub const SALE_ONE_DAY: &str = "/sales/USD/:date";
pub const SALE_RANGE: &str = "/sales/USD/:start/:end";

/// Build the service router with the full middleware chain.
///
/// Layer order matters: the rate gate must sit outside the cache gate.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(RATE_ONE_DAY, get(rates::rate_one_day))
        .route(RATE_RANGE, get(rates::rate_range))
        .route(SALE_ONE_DAY, get(sales::sale_one_day))
        .route(SALE_RANGE, get(sales::sale_range))
        .layer(axum::middleware::from_fn_with_state(state.clone(), cache_gate))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
