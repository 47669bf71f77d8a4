use crate::date_range::validate_date_range;
use crate::models::{generate_run_id, RunResult, RunStatus};
use crate::observer::RunObserver;
use crate::trade_source::DayTradeSource;
use anyhow::{ensure, Result};
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

/// Drives a backtest one calendar day at a time, tracking consecutive days
/// on which no instrument had price data and aborting the run once that
/// streak reaches the configured threshold.
pub struct DayDriver<'a> {
    max_missing_days: u32,
    observer: &'a mut dyn RunObserver,
}

impl<'a> DayDriver<'a> {
    pub fn new(max_missing_days: u32, observer: &'a mut dyn RunObserver) -> Self {
        Self {
            max_missing_days,
            observer,
        }
    }

    /// Processes every date in order, collecting each day's trades.
    ///
    /// Days are handled strictly sequentially; the streak counter is only
    /// correct over an ordered, strictly increasing date sequence, which is
    /// validated up front. Every processed day is stored in the result map,
    /// missing-data days as empty lists, so an aborted run still carries a
    /// complete audit trail. Persisting that trail is the caller's job,
    /// keyed off the aborted status.
    pub fn run(
        &mut self,
        dates: &[NaiveDate],
        source: &mut dyn DayTradeSource,
    ) -> Result<RunResult> {
        ensure!(
            self.max_missing_days > 0,
            "max_missing_days must be greater than zero"
        );
        validate_date_range(dates)?;

        let mut trades_by_day = BTreeMap::new();
        let mut missing_day_streak = 0u32;
        let mut processed_day_count = 0usize;
        let mut reset_occurred = false;
        let mut last_processed_date = None;
        let mut status = RunStatus::Completed;

        for &date in dates {
            processed_day_count += 1;
            last_processed_date = Some(date);

            let day = source.trades_for_day(date);
            let trade_count = day.trades.len();
            trades_by_day.insert(date, day.trades);

            if !day.any_data_found {
                missing_day_streak += 1;
                self.observer.missing_day(date, missing_day_streak);

                if missing_day_streak >= self.max_missing_days {
                    status = RunStatus::Aborted;
                    self.observer.run_aborted(date, missing_day_streak);
                    break;
                }
            } else {
                if missing_day_streak > 0 {
                    reset_occurred = true;
                    self.observer.streak_reset(date, missing_day_streak);
                }
                missing_day_streak = 0;
                self.observer.day_processed(date, trade_count);
            }
        }

        Ok(RunResult {
            run_id: generate_run_id(),
            start_date: dates[0],
            end_date: *dates.last().expect("validated non-empty"),
            status,
            trades_by_day,
            processed_day_count,
            final_streak: missing_day_streak,
            reset_occurred,
            last_processed_date,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trade, TradeSide, TradingDay};
    use crate::observer::NullObserver;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn dates(from: u32, to: u32) -> Vec<NaiveDate> {
        (from..=to).map(date).collect()
    }

    /// Trade source scripted by the set of dates that have data.
    struct ScriptedSource {
        found_dates: Vec<NaiveDate>,
    }

    impl ScriptedSource {
        fn new(found_dates: Vec<NaiveDate>) -> Self {
            Self { found_dates }
        }
    }

    impl DayTradeSource for ScriptedSource {
        fn trades_for_day(&mut self, date: NaiveDate) -> TradingDay {
            if self.found_dates.contains(&date) {
                TradingDay {
                    trades: vec![Trade {
                        symbol: "AAPL".to_string(),
                        side: TradeSide::Buy,
                        quantity: 100,
                        price: 100.0,
                        date,
                    }],
                    any_data_found: true,
                }
            } else {
                TradingDay::empty()
            }
        }
    }

    #[test]
    fn completes_when_every_day_has_data() {
        let range = dates(1, 10);
        let mut source = ScriptedSource::new(range.clone());
        let mut observer = NullObserver;
        let result = DayDriver::new(3, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.processed_day_count, 10);
        assert_eq!(result.final_streak, 0);
        assert!(!result.reset_occurred);
        assert_eq!(result.trades_by_day.len(), 10);
        assert_eq!(result.last_processed_date, Some(date(10)));
    }

    #[test]
    fn aborts_on_the_kth_consecutive_missing_day() {
        let range = dates(1, 10);
        // Data on days 1-2 only; streak starts on day 3 and hits 3 on day 5.
        let mut source = ScriptedSource::new(dates(1, 2));
        let mut observer = NullObserver;
        let result = DayDriver::new(3, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert!(result.aborted());
        assert_eq!(result.processed_day_count, 5);
        assert_eq!(result.last_processed_date, Some(date(5)));
        assert_eq!(result.final_streak, 3);
        // The abort day itself is stored.
        assert_eq!(result.trades_by_day.len(), 5);
        assert!(result.trades_by_day.get(&date(5)).unwrap().is_empty());
    }

    #[test]
    fn found_day_resets_streak_even_from_threshold_minus_one() {
        let range = dates(1, 9);
        // Missing 1-4, found 5, missing 6-9: streak peaks at 4, never 5.
        let mut source = ScriptedSource::new(vec![date(5)]);
        let mut observer = NullObserver;
        let result = DayDriver::new(5, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.processed_day_count, 9);
        assert!(result.reset_occurred);
        assert_eq!(result.final_streak, 4);
    }

    #[test]
    fn streak_reaching_threshold_on_final_day_still_aborts() {
        let range = dates(1, 3);
        let mut source = ScriptedSource::new(Vec::new());
        let mut observer = NullObserver;
        let result = DayDriver::new(3, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(result.processed_day_count, 3);
    }

    #[test]
    fn short_range_below_threshold_always_completes() {
        let range = dates(1, 5);
        let mut source = ScriptedSource::new(Vec::new());
        let mut observer = NullObserver;
        let result = DayDriver::new(10, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.processed_day_count, 5);
        assert_eq!(result.final_streak, 5);
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut source = ScriptedSource::new(Vec::new());
        let mut observer = NullObserver;
        assert!(DayDriver::new(3, &mut observer)
            .run(&[], &mut source)
            .is_err());
    }

    #[test]
    fn unordered_range_is_rejected_before_processing() {
        let range = vec![date(2), date(1)];
        let mut source = ScriptedSource::new(Vec::new());
        let mut observer = NullObserver;
        assert!(DayDriver::new(3, &mut observer)
            .run(&range, &mut source)
            .is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let range = dates(1, 3);
        let mut source = ScriptedSource::new(range.clone());
        let mut observer = NullObserver;
        assert!(DayDriver::new(0, &mut observer)
            .run(&range, &mut source)
            .is_err());
    }

    #[test]
    fn threshold_of_one_aborts_on_first_missing_day() {
        let range = dates(1, 5);
        let mut source = ScriptedSource::new(dates(1, 2));
        let mut observer = NullObserver;
        let result = DayDriver::new(1, &mut observer)
            .run(&range, &mut source)
            .unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(result.processed_day_count, 3);
        assert_eq!(result.last_processed_date, Some(date(3)));
    }

    #[test]
    fn abort_lands_on_kth_missing_day_for_each_threshold() {
        // Data on days 1-3 only, range 1-20: the streak begins on day 4.
        for threshold in 1..=5u32 {
            let range = dates(1, 20);
            let mut source = ScriptedSource::new(dates(1, 3));
            let mut observer = NullObserver;
            let result = DayDriver::new(threshold, &mut observer)
                .run(&range, &mut source)
                .unwrap();

            assert_eq!(result.status, RunStatus::Aborted);
            assert_eq!(result.processed_day_count, 3 + threshold as usize);
            assert_eq!(result.last_processed_date, Some(date(3 + threshold)));
        }
    }
}
