//! Axum HTTP surface for the fxrates service.
//!
//! Request pipeline, outermost first: rate-limit gate, response cache,
//! handler. The order is load-bearing: a cache hit still consumes rate-limit
//! quota, and a rate-limited request never reaches the cache or the
//! warehouse.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

pub use api::app_router;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::{build_state, init_tracing, start_maintenance_sweeper, AppState};
