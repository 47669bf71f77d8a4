use crate::models::{Bar, PriceField};
use anyhow::Result;
use chrono::NaiveDate;
use log::warn;
use std::collections::{BTreeMap, HashMap};

/// Price lookup keyed by (symbol, date, field).
///
/// `Ok(None)` means the provider has no data for that symbol and date; it is
/// the only outcome that counts toward the missing-day streak. `Err` is a
/// hard provider failure and is recovered by the day trade source, never by
/// the driver.
pub trait PriceSource {
    fn price(&self, symbol: &str, date: NaiveDate, field: PriceField) -> Result<Option<f64>>;
}

/// In-memory price table holding one daily bar per (symbol, date).
#[derive(Debug, Default)]
pub struct StaticPriceTable {
    bars: HashMap<String, BTreeMap<NaiveDate, Bar>>,
}

impl StaticPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, date: NaiveDate, bar: Bar) {
        self.bars
            .entry(symbol.to_uppercase())
            .or_default()
            .insert(date, bar);
    }

    /// Inserts a flat bar where every field carries the same price.
    pub fn insert_flat(&mut self, symbol: &str, date: NaiveDate, price: f64) {
        self.insert(
            symbol,
            date,
            Bar {
                open: price,
                high: price,
                low: price,
                close: price,
            },
        );
    }

}

impl PriceSource for StaticPriceTable {
    fn price(&self, symbol: &str, date: NaiveDate, field: PriceField) -> Result<Option<f64>> {
        let value = self
            .bars
            .get(&symbol.to_uppercase())
            .and_then(|by_date| by_date.get(&date))
            .map(|bar| bar.field(field));

        match value {
            Some(price) if !price.is_finite() => {
                warn!(
                    "Ignoring non-finite {} price for {} on {}",
                    field.as_str(),
                    symbol,
                    date
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }
}
