use sqlx::SqlitePool;
use time::Date;

use super::error::WarehouseError;
use super::models::{RateRow, SaleRow};

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub url: String,
}

/// Pooled SQLite store behind the four read contracts.
///
/// Connections are checked out per query and returned to the pool when the
/// query future completes, on error and panic paths included, so one failing
/// request cannot leak connection state into the next.
pub struct Warehouse {
    pool: SqlitePool,
}

impl Warehouse {
    pub async fn connect(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        let pool = SqlitePool::connect(&config.url)
            .await
            .map_err(|e| WarehouseError::ConnectionError(e.to_string()))?;

        Self::initialize_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<(), WarehouseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exchange_rates (
                date TEXT PRIMARY KEY,
                rate REAL NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sales (
                date TEXT PRIMARY KEY,
                sale_usd REAL NOT NULL,
                sale_pln REAL NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(())
    }

    pub async fn fetch_single_rate(&self, day: Date) -> Result<Option<RateRow>, WarehouseError> {
        let row = sqlx::query_as::<_, RateRow>(
            "SELECT date, rate FROM exchange_rates WHERE date = ?",
        )
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(row)
    }

    pub async fn fetch_rate_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<RateRow>, WarehouseError> {
        // ISO-8601 text dates order lexicographically, so BETWEEN is correct.
        let rows = sqlx::query_as::<_, RateRow>(
            "SELECT date, rate FROM exchange_rates WHERE date BETWEEN ? AND ? ORDER BY date",
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(rows)
    }

    pub async fn fetch_single_sale(&self, day: Date) -> Result<Option<SaleRow>, WarehouseError> {
        let row = sqlx::query_as::<_, SaleRow>(
            "SELECT date, sale_usd, sale_pln FROM sales WHERE date = ?",
        )
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(row)
    }

    pub async fn fetch_sale_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<SaleRow>, WarehouseError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT date, sale_usd, sale_pln FROM sales WHERE date BETWEEN ? AND ? ORDER BY date",
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(rows)
    }

    pub async fn upsert_rate(&self, row: RateRow) -> Result<(), WarehouseError> {
        sqlx::query("INSERT OR REPLACE INTO exchange_rates (date, rate) VALUES (?, ?)")
            .bind(&row.date)
            .bind(row.rate)
            .execute(&self.pool)
            .await
            .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(())
    }

    pub async fn upsert_sale(&self, row: SaleRow) -> Result<(), WarehouseError> {
        sqlx::query("INSERT OR REPLACE INTO sales (date, sale_usd, sale_pln) VALUES (?, ?, ?)")
            .bind(&row.date)
            .bind(row.sale_usd)
            .bind(row.sale_pln)
            .execute(&self.pool)
            .await
            .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        Ok(())
    }

    /// Drain the pool on shutdown. Per-request connection release does not go
    /// through here; it happens when each query future completes.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
