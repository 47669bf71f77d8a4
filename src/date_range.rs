use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("date range is empty")]
    Empty,
    #[error("date range is not strictly increasing at {date}")]
    NotIncreasing { date: NaiveDate },
}

/// Enumerates every calendar date from `start` through `end` inclusive, one
/// day at a time.
pub fn generate_date_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, RangeError> {
    if start > end {
        return Err(RangeError::StartAfterEnd { start, end });
    }

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(dates)
}

/// Checks that a date sequence is non-empty and strictly increasing. The
/// streak counter is only meaningful over ordered days, so the driver rejects
/// anything else before processing the first date.
pub fn validate_date_range(dates: &[NaiveDate]) -> Result<(), RangeError> {
    if dates.is_empty() {
        return Err(RangeError::Empty);
    }
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(RangeError::NotIncreasing { date: pair[1] });
        }
    }
    Ok(())
}
