//! SQLite-backed repository for historical USD exchange rates and sales.
//!
//! The request pipeline reads through four narrow contracts
//! (`fetch_single_rate`, `fetch_rate_range`, `fetch_single_sale`,
//! `fetch_sale_range`) and treats the rows as pass-through data. This crate
//! also owns the process-wide date window the validator is configured with.

mod error;
mod models;
mod repository;

pub use error::WarehouseError;
pub use models::{RateRow, SaleRow};
pub use repository::{Warehouse, WarehouseConfig};

use time::macros::date;
use time::Date;

/// Earliest date with data in the historical window.
pub const MIN_DATE: Date = date!(2002 - 01 - 02);

/// Latest date with data in the historical window.
pub const MAX_DATE: Date = date!(2024 - 12 - 31);
