use crate::models::PriceField;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default number of consecutive no-data days tolerated before a run aborts.
pub const DEFAULT_MAX_MISSING_DAYS: u32 = 10;

/// Per-instrument trading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentConfig {
    pub trade_on: PriceField,
    pub order_quantity: i32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            trade_on: PriceField::Close,
            order_quantity: 100,
        }
    }
}

/// Runtime settings for a backtest run, parsed from the engine's string
/// settings map.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_missing_days: u32,
}

impl DriverSettings {
    pub fn from_settings_map(settings: &HashMap<String, String>) -> Result<Self> {
        let start_date = require_setting_date(settings, "BACKTEST_START_DATE")?;
        let end_date = require_setting_date(settings, "BACKTEST_END_DATE")?;
        let max_missing_days = optional_setting_u32(
            settings,
            "MAX_MISSING_DAYS",
            DEFAULT_MAX_MISSING_DAYS,
            1,
        )?;

        if start_date > end_date {
            return Err(anyhow!(
                "BACKTEST_START_DATE ({}) must be on or before BACKTEST_END_DATE ({})",
                start_date,
                end_date
            ));
        }

        Ok(Self {
            start_date,
            end_date,
            max_missing_days,
        })
    }
}

/// Parses an instrument universe from JSON, e.g.
/// `{"AAPL": {"tradeOn": "Close"}, "MSFT": {"orderQuantity": 50}}`.
/// Omitted fields fall back to the instrument defaults.
pub fn parse_instrument_map_from_json(json: &str) -> Result<BTreeMap<String, InstrumentConfig>> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawInstrument {
        trade_on: Option<String>,
        order_quantity: Option<i32>,
    }

    let raw: BTreeMap<String, RawInstrument> = serde_json::from_str(json)
        .map_err(|error| anyhow!("Invalid instrument JSON: {}", error))?;

    let mut instruments = BTreeMap::new();
    for (symbol, entry) in raw {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(anyhow!("Instrument symbols must not be empty"));
        }
        let defaults = InstrumentConfig::default();
        let trade_on = match entry.trade_on {
            Some(raw_field) => raw_field.parse::<PriceField>()?,
            None => defaults.trade_on,
        };
        let order_quantity = entry.order_quantity.unwrap_or(defaults.order_quantity);
        if order_quantity <= 0 {
            return Err(anyhow!(
                "Instrument {} must have a positive order quantity (value: {})",
                symbol,
                order_quantity
            ));
        }
        instruments.insert(
            symbol,
            InstrumentConfig {
                trade_on,
                order_quantity,
            },
        );
    }

    if instruments.is_empty() {
        return Err(anyhow!("Instrument JSON must define at least one symbol"));
    }

    Ok(instruments)
}

fn require_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("Missing required setting {}", key))
}

pub fn require_setting_date(settings: &HashMap<String, String>, key: &str) -> Result<NaiveDate> {
    let raw = require_setting(settings, key)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        anyhow!(
            "Setting {} must be a date in YYYY-MM-DD format (value: {})",
            key,
            raw
        )
    })
}

fn optional_setting_u32(
    settings: &HashMap<String, String>,
    key: &str,
    default: u32,
    min: u32,
) -> Result<u32> {
    let Some(raw) = settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
    else {
        return Ok(default);
    };

    let value = raw
        .parse::<u32>()
        .map_err(|_| anyhow!("Setting {} must be an integer (value: {})", key, raw))?;
    if value < min {
        return Err(anyhow!(
            "Setting {} must be >= {} (value: {})",
            key,
            min,
            raw
        ));
    }
    Ok(value)
}
