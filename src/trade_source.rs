use crate::config::InstrumentConfig;
use crate::market_data::PriceSource;
use crate::models::{Trade, TradeSide, TradingDay};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Produces the trades for one date together with a flag saying whether any
/// instrument had usable price data that day.
///
/// Implementations must not fail for "no data": absence is reported through
/// `any_data_found = false` and an empty trade list.
pub trait DayTradeSource {
    fn trades_for_day(&mut self, date: NaiveDate) -> TradingDay;
}

/// Day trade source over a configured instrument universe and a price
/// lookup.
///
/// A day counts as found when at least one instrument has a price; one
/// instrument's outage never marks the whole day missing. Hard lookup
/// failures are logged and degrade to "no trade for that instrument".
pub struct InstrumentTradeSource<P: PriceSource> {
    instruments: BTreeMap<String, InstrumentConfig>,
    prices: P,
}

impl<P: PriceSource> InstrumentTradeSource<P> {
    pub fn new(instruments: BTreeMap<String, InstrumentConfig>, prices: P) -> Self {
        Self {
            instruments,
            prices,
        }
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }
}

impl<P: PriceSource> DayTradeSource for InstrumentTradeSource<P> {
    fn trades_for_day(&mut self, date: NaiveDate) -> TradingDay {
        let mut trades = Vec::new();
        let mut any_data_found = false;

        for (symbol, instrument) in &self.instruments {
            let lookup = self.prices.price(symbol, date, instrument.trade_on);
            let price = match lookup {
                Ok(price) => price,
                Err(error) => {
                    warn!(
                        "Price lookup failed for {} on {}: {}; treating as no data",
                        symbol, date, error
                    );
                    None
                }
            };
            let Some(price) = price else {
                debug!("{}: no {} price for {}", symbol, instrument.trade_on.as_str(), date);
                continue;
            };

            any_data_found = true;
            trades.push(Trade {
                symbol: symbol.clone(),
                side: TradeSide::Buy,
                quantity: instrument.order_quantity,
                price,
                date,
            });
        }

        TradingDay {
            trades,
            any_data_found,
        }
    }
}
