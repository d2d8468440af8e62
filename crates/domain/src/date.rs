use crate::recurrence::RecurrenceError;
use chrono::{prelude::*, Duration, DurationRound};

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 2100;

/// Parses a plain date on the form `YYYY-M-D` (zero padding optional)
pub fn parse_date(datestr: &str) -> Result<NaiveDate, RecurrenceError> {
    let invalid = || RecurrenceError::InvalidDate(datestr.to_string());
    let dates = datestr.split('-').collect::<Vec<_>>();
    if dates.len() != 3 {
        return Err(invalid());
    }
    let year = dates[0].parse::<i32>().map_err(|_| invalid())?;
    let month = dates[1].parse::<u32>().map_err(|_| invalid())?;
    let day = dates[2].parse::<u32>().map_err(|_| invalid())?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    let month_length = get_month_length(year, month);
    if day < 1 || day > month_length {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses either a RFC 3339 timestamp or a plain date, the latter
/// being interpreted as midnight UTC. The result is truncated to whole
/// microseconds, the precision timestamps are stored with.
pub fn parse_datetime(datestr: &str) -> Result<DateTime<Utc>, RecurrenceError> {
    let datestr = datestr.trim();
    let datetime = match DateTime::parse_from_rfc3339(datestr) {
        Ok(datetime) => datetime.with_timezone(&Utc),
        Err(_) => {
            let midnight = parse_date(datestr)?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| RecurrenceError::InvalidDate(datestr.to_string()))?;
            Utc.from_utc_datetime(&midnight)
        }
    };

    if !(MIN_YEAR..=MAX_YEAR).contains(&datetime.year()) {
        return Err(RecurrenceError::InvalidDate(datestr.to_string()));
    }
    datetime
        .duration_trunc(Duration::microseconds(1))
        .map_err(|_| RecurrenceError::InvalidDate(datestr.to_string()))
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month - 1 {
        0 => 31,
        1 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        2 => 31,
        3 => 30,
        4 => 31,
        5 => 30,
        6 => 31,
        7 => 31,
        8 => 30,
        9 => 31,
        10 => 30,
        11 => 31,
        _ => panic!("Invalid month"),
    }
}
