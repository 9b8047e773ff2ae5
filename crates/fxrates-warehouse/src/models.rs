use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One day's USD mid exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RateRow {
    pub date: String,
    pub rate: f64,
}

/// One day's sales totals, in USD and in the settlement currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SaleRow {
    pub date: String,
    pub sale_usd: f64,
    pub sale_pln: f64,
}
