use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use fxrates_core::{normalize_range, validate};
use fxrates_warehouse::RateRow;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /exchange-rates/USD/:date` — one day's rate, or `null` when the day
/// has no row.
pub async fn rate_one_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Option<RateRow>>> {
    let day = validate(&date, state.bounds)?;
    let row = state.warehouse.fetch_single_rate(day).await?;
    Ok(Json(row))
}

/// `GET /exchange-rates/USD/:start/:end` — the rate series over an ordered,
/// in-bounds span.
pub async fn rate_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<Json<Vec<RateRow>>> {
    let (start, end) = normalize_range(&start, &end, state.bounds)?;
    let rows = state.warehouse.fetch_rate_range(start, end).await?;
    Ok(Json(rows))
}
