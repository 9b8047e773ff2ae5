use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use fxrates_core::{normalize_range, validate};
use fxrates_warehouse::SaleRow;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /sales/USD/:date` — one day's sales totals, or `null` when the day
/// has no row.
pub async fn sale_one_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Option<SaleRow>>> {
    let day = validate(&date, state.bounds)?;
    let row = state.warehouse.fetch_single_sale(day).await?;
    Ok(Json(row))
}

/// `GET /sales/USD/:start/:end` — the sales series over an ordered, in-bounds
/// span.
pub async fn sale_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SaleRow>>> {
    let (start, end) = normalize_range(&start, &end, state.bounds)?;
    let rows = state.warehouse.fetch_sale_range(start, end).await?;
    Ok(Json(rows))
}
