use chrono::NaiveDate;
use log::{info, warn};

/// Run events emitted by the day driver. Injected so callers choose where
/// progress goes instead of the driver writing to a process-wide channel.
pub trait RunObserver {
    fn day_processed(&mut self, _date: NaiveDate, _trade_count: usize) {}
    fn missing_day(&mut self, _date: NaiveDate, _streak: u32) {}
    fn streak_reset(&mut self, _date: NaiveDate, _prior_streak: u32) {}
    fn run_aborted(&mut self, _date: NaiveDate, _streak: u32) {}
}

/// Forwards run events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn day_processed(&mut self, date: NaiveDate, trade_count: usize) {
        info!(
            "{}: generated {} trade{}",
            date,
            trade_count,
            if trade_count == 1 { "" } else { "s" }
        );
    }

    fn missing_day(&mut self, date: NaiveDate, streak: u32) {
        info!(
            "{}: no price data for any instrument (day {} without data)",
            date, streak
        );
    }

    fn streak_reset(&mut self, date: NaiveDate, prior_streak: u32) {
        info!(
            "{}: price data available again (streak reset: {} -> 0)",
            date, prior_streak
        );
    }

    fn run_aborted(&mut self, date: NaiveDate, streak: u32) {
        warn!(
            "Backtest aborted: {} consecutive days without price data for any instrument; \
             last processed day {}. Instruments may be delisted or the range may extend \
             past available history.",
            streak, date
        );
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {}
