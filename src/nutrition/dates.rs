//! Date range handling for nutrition queries.
//!
//! Policy: caller dates are calendar dates taken at UTC midnight with no
//! local offset shift. The end boundary is exclusive and sits at midnight of
//! the day after the selected end date, so the whole last day is included.

use thiserror::Error;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const BOUNDARY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Word separating the two dates in a range payload.
pub const RANGE_SEPARATOR: &str = "to";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("expected \"<start> to <end>\", got {0:?}")]
    MissingSeparator(String),
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: Date, end: Date },
    #[error("end date {0} is out of range")]
    OutOfRange(Date),
}

/// The caller's range as typed, plus the parsed calendar dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRange {
    pub start_display: String,
    pub end_display: String,
    pub start: Date,
    pub end: Date,
}

/// Inclusive-start / exclusive-end UTC boundaries, formatted for comparison
/// against stored timestamp strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtcRange {
    pub start: String,
    pub end: String,
}

/// Parses the first ten characters of a date-picker token as `YYYY-MM-DD`.
pub fn parse_date_token(token: &str) -> Result<Date, DateRangeError> {
    let head = token
        .get(..10)
        .ok_or_else(|| DateRangeError::InvalidDate(token.to_string()))?;
    Date::parse(head, DATE_FORMAT).map_err(|_| DateRangeError::InvalidDate(token.to_string()))
}

/// Splits `"<start> to <end>"` into its two dates.
pub fn parse_range_payload(payload: &str) -> Result<DisplayRange, DateRangeError> {
    let tokens: Vec<&str> = payload.split_whitespace().collect();
    let [start_display, sep, end_display] = tokens.as_slice() else {
        return Err(DateRangeError::MissingSeparator(payload.to_string()));
    };
    if !sep.eq_ignore_ascii_case(RANGE_SEPARATOR) {
        return Err(DateRangeError::MissingSeparator(payload.to_string()));
    }

    let start = parse_date_token(start_display)?;
    let end = parse_date_token(end_display)?;
    if end < start {
        return Err(DateRangeError::EndBeforeStart { start, end });
    }

    Ok(DisplayRange {
        start_display: start_display.to_string(),
        end_display: end_display.to_string(),
        start,
        end,
    })
}

pub fn normalize(start: Date, end: Date) -> Result<UtcRange, DateRangeError> {
    if end < start {
        return Err(DateRangeError::EndBeforeStart { start, end });
    }
    let end_exclusive = end.next_day().ok_or(DateRangeError::OutOfRange(end))?;
    Ok(UtcRange {
        start: format_boundary(start)?,
        end: format_boundary(end_exclusive)?,
    })
}

fn format_boundary(day: Date) -> Result<String, DateRangeError> {
    day.midnight()
        .format(BOUNDARY_FORMAT)
        .map_err(|_| DateRangeError::OutOfRange(day))
}

/// Number of calendar days covered, counting both ends.
pub fn num_days(start: Date, end: Date) -> u32 {
    ((end - start).whole_days().max(0) + 1) as u32
}
