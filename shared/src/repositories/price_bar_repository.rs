use sea_orm::prelude::*;
use sea_orm::{QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::{debug, info};

use crate::entity::price_bars;
use crate::error::{StoreError, StoreResult};
use crate::models::PriceBar;

/// Rows per INSERT statement during a bulk replace.
const INSERT_BATCH_SIZE: usize = 500;

/// Access to the `price_bars` table.
///
/// Every method is a single store round-trip except `insert` (existence check,
/// then write) and `replace_all` (delete, then batched inserts).
#[derive(Clone)]
pub struct PriceBarRepository {
    db: Arc<DatabaseConnection>,
}

impl PriceBarRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn insert(&self, bar: &PriceBar) -> StoreResult<()> {
        let existing = price_bars::Entity::find_by_id(bar.timestamp.clone())
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict("Timestamp already exists".to_string()));
        }

        price_bars::Entity::insert(bar.to_active_model())
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| StoreError::from_write(e, "Timestamp already exists"))?;

        debug!("Inserted price bar {}", bar.timestamp);
        Ok(())
    }

    /// All bars ordered by date label ascending (lexical), then timestamp.
    pub async fn get_all(&self) -> StoreResult<Vec<PriceBar>> {
        let rows = price_bars::Entity::find()
            .order_by_asc(price_bars::Column::Dt)
            .order_by_asc(price_bars::Column::Timestamp)
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(PriceBar::from).collect())
    }

    pub async fn get_by_date(&self, date: &str) -> StoreResult<Vec<PriceBar>> {
        let rows = price_bars::Entity::find()
            .filter(price_bars::Column::Dt.eq(date))
            .order_by_asc(price_bars::Column::Timestamp)
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(PriceBar::from).collect())
    }

    pub async fn get_by_timestamp(&self, ts: &str) -> StoreResult<PriceBar> {
        price_bars::Entity::find_by_id(ts.to_string())
            .one(self.db.as_ref())
            .await?
            .map(PriceBar::from)
            .ok_or_else(|| StoreError::NotFound("Timestamp not found".to_string()))
    }

    /// First `limit` bars in the table's natural iteration order.
    pub async fn first_n(&self, limit: u64) -> StoreResult<Vec<PriceBar>> {
        // Drivers bind LIMIT as a signed 64-bit integer
        let rows = price_bars::Entity::find()
            .limit(limit.min(i64::MAX as u64))
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(PriceBar::from).collect())
    }

    pub async fn count(&self) -> StoreResult<u64> {
        let count = price_bars::Entity::find().count(self.db.as_ref()).await?;
        Ok(count)
    }

    /// Replace every column of the bar stored under `ts`, the key included.
    pub async fn update(&self, ts: &str, bar: &PriceBar) -> StoreResult<()> {
        let result = price_bars::Entity::update_many()
            .set(bar.to_active_model())
            .filter(price_bars::Column::Timestamp.eq(ts))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| StoreError::from_write(e, "Timestamp already exists"))?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("Record not found".to_string()));
        }
        debug!("Updated price bar {} -> {}", ts, bar.timestamp);
        Ok(())
    }

    pub async fn delete(&self, ts: &str) -> StoreResult<()> {
        let result = price_bars::Entity::delete_by_id(ts.to_string())
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("Record not found".to_string()));
        }
        debug!("Deleted price bar {}", ts);
        Ok(())
    }

    /// Drop every stored bar and store `bars` as the complete table.
    ///
    /// Not wrapped in a transaction: concurrent readers can see an empty or
    /// partially filled table, and a failing batch leaves earlier batches in
    /// place.
    pub async fn replace_all(&self, bars: &[PriceBar]) -> StoreResult<u64> {
        let removed = price_bars::Entity::delete_many()
            .exec(self.db.as_ref())
            .await?;
        info!("Cleared {} price bars before import", removed.rows_affected);

        for chunk in bars.chunks(INSERT_BATCH_SIZE) {
            price_bars::Entity::insert_many(chunk.iter().map(PriceBar::to_active_model))
                .exec_without_returning(self.db.as_ref())
                .await
                .map_err(|e| StoreError::from_write(e, "Duplicate timestamp in import data"))?;
        }

        info!("Imported {} price bars", bars.len());
        Ok(bars.len() as u64)
    }
}
