use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// Candle field a trade is priced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
        }
    }
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::Close
    }
}

impl FromStr for PriceField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(anyhow!("Unknown price field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

/// A trade synthesized for one instrument on one trading day. The driver
/// only counts and stores these; interpretation belongs to downstream
/// consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: i32,
    pub price: f64,
    pub date: NaiveDate,
}

/// Daily OHLC prices for one instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn field(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }
}

/// Outcome of producing trades for a single date. `any_data_found` is an OR
/// across all configured instruments; absence of data is signalled here, not
/// raised as an error.
#[derive(Debug, Clone)]
pub struct TradingDay {
    pub trades: Vec<Trade>,
    pub any_data_found: bool,
}

impl TradingDay {
    pub fn empty() -> Self {
        Self {
            trades: Vec::new(),
            any_data_found: false,
        }
    }
}

/// Terminal state of a run. A run that exhausts its date range completes; a
/// run whose missing-day streak reaches the threshold aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RunStatus,
    pub trades_by_day: BTreeMap<NaiveDate, Vec<Trade>>,
    pub processed_day_count: usize,
    pub final_streak: u32,
    pub reset_occurred: bool,
    pub last_processed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl RunResult {
    pub fn aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }

    /// Total trades stored across all processed days.
    pub fn total_trades(&self) -> usize {
        self.trades_by_day.values().map(|trades| trades.len()).sum()
    }
}

pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
