use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::entity::price_bars;

/// One OHLC observation, keyed by its timestamp string.
///
/// `date` and `time_value` travel as `dt` and `time` on the wire, in CSV
/// headers and in the database, so existing clients and data files keep
/// working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(rename = "dt")]
    pub date: String,
    #[serde(rename = "time")]
    pub time_value: f64,
}

impl PriceBar {
    /// Active model with every column set, used for inserts and full updates.
    pub fn to_active_model(&self) -> price_bars::ActiveModel {
        price_bars::ActiveModel {
            timestamp: ActiveValue::Set(self.timestamp.clone()),
            open: ActiveValue::Set(self.open),
            high: ActiveValue::Set(self.high),
            low: ActiveValue::Set(self.low),
            close: ActiveValue::Set(self.close),
            dt: ActiveValue::Set(self.date.clone()),
            time: ActiveValue::Set(self.time_value),
        }
    }
}

impl From<price_bars::Model> for PriceBar {
    fn from(m: price_bars::Model) -> Self {
        Self {
            timestamp: m.timestamp,
            open: m.open,
            high: m.high,
            low: m.low,
            close: m.close,
            date: m.dt,
            time_value: m.time,
        }
    }
}

/// Plain `{message}` payload used for confirmations and empty results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
