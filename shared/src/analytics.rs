//! Derived analytics over price bars
//!
//! Everything here is a pure function of the bars handed in; nothing is
//! persisted.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::PriceBar;

/// Spread above which a bar is flagged as volatile.
pub const VOLATILITY_THRESHOLD: f64 = 5.0;

/// Default number of bars in the volatility report.
pub const DEFAULT_VOLATILITY_LIMIT: u64 = 10;

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: String,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: u64,
    pub average_close: f64,
    pub max_high: f64,
    pub min_low: f64,
}

/// Bar direction used by the spread endpoint. Ties are `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(bar: &PriceBar) -> Self {
        if bar.close > bar.open {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Candle colour label used by the volatility report. Ties are `Bearish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Bullish,
    Bearish,
}

impl TrendLabel {
    pub fn of(bar: &PriceBar) -> Self {
        if bar.close > bar.open {
            TrendLabel::Bullish
        } else {
            TrendLabel::Bearish
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub timestamp: String,
    pub spread: f64,
    pub trend: Direction,
    pub is_volatile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEntry {
    pub timestamp: String,
    pub range: f64,
    pub trend: TrendLabel,
}

/// Close price series in the order the bars are given.
pub fn trend_series(bars: &[PriceBar]) -> Vec<TrendPoint> {
    bars.iter()
        .map(|b| TrendPoint {
            timestamp: b.timestamp.clone(),
            close: b.close,
        })
        .collect()
}

/// KPI summary, or `None` when there are no bars.
pub fn summary(bars: &[PriceBar]) -> Option<Summary> {
    if bars.is_empty() {
        return None;
    }

    let total = bars.len();
    let avg_close = bars.iter().map(|b| b.close).sum::<f64>() / total as f64;
    let max_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let min_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    Some(Summary {
        total_records: total as u64,
        average_close: round2(avg_close),
        max_high,
        min_low,
    })
}

pub fn spread(bar: &PriceBar) -> Spread {
    let value = round2(bar.high - bar.low);
    Spread {
        timestamp: bar.timestamp.clone(),
        spread: value,
        trend: Direction::of(bar),
        is_volatile: value > VOLATILITY_THRESHOLD,
    }
}

pub fn volatility_report(bars: &[PriceBar]) -> Vec<VolatilityEntry> {
    bars.iter()
        .map(|b| VolatilityEntry {
            timestamp: b.timestamp.clone(),
            range: round2(b.high - b.low),
            trend: TrendLabel::of(b),
        })
        .collect()
}

/// Columns of the correlation matrix, in output order.
pub const PRICE_COLUMNS: [&str; 4] = ["open", "high", "low", "close"];

/// Pearson correlation between the four price columns.
///
/// `values[i][j]` is `None` when either column has zero variance, which
/// includes every single-bar input.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub values: [[Option<f64>; 4]; 4],
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = PRICE_COLUMNS.iter().position(|c| *c == row)?;
        let j = PRICE_COLUMNS.iter().position(|c| *c == col)?;
        self.values[i][j]
    }
}

/// Serializes column-major as `{column: {row: coefficient}}`, keeping column
/// order. The matrix is symmetric so this equals the row-major form.
impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Column<'a>(&'a [[Option<f64>; 4]; 4], usize);

        impl Serialize for Column<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(PRICE_COLUMNS.len()))?;
                for (i, name) in PRICE_COLUMNS.iter().enumerate() {
                    map.serialize_entry(name, &self.0[i][self.1])?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(PRICE_COLUMNS.len()))?;
        for (j, name) in PRICE_COLUMNS.iter().enumerate() {
            map.serialize_entry(name, &Column(&self.values, j))?;
        }
        map.end()
    }
}

/// Correlation matrix of open/high/low/close, or `None` when there are no bars.
pub fn correlation(bars: &[PriceBar]) -> Option<CorrelationMatrix> {
    if bars.is_empty() {
        return None;
    }

    let columns: [Vec<f64>; 4] = [
        bars.iter().map(|b| b.open).collect(),
        bars.iter().map(|b| b.high).collect(),
        bars.iter().map(|b| b.low).collect(),
        bars.iter().map(|b| b.close).collect(),
    ];

    let mut values = [[None; 4]; 4];
    for i in 0..4 {
        for j in i..4 {
            let r = if i == j {
                // 1.0 exactly, unless the column is constant
                pearson(&columns[i], &columns[j]).map(|_| 1.0)
            } else {
                pearson(&columns[i], &columns[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix { values })
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    // Clamp float noise so |r| never exceeds 1
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
