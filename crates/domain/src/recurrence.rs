use crate::date::{get_month_length, parse_datetime};
use chrono::{prelude::*, Duration, LocalResult};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

const MAX_INTERVAL: u32 = 1000;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(Self::OneTime),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(RecurrenceError::InvalidPattern(format!(
                "Unknown reminder type: {}",
                s
            ))),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// The recurrence detail as it is sent by clients. It is only a
/// description and has to be turned into a `Recurrence` together with a
/// `ReminderType` before it can be used.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RecurrencePattern {
    /// Repeat every `interval` days / weeks / months / years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// Weekly only. 0 is Monday and 6 is Sunday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<u32>>,
    /// Monthly and yearly only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// No occurrences after this point in time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

/// A validated recurrence rule keyed by the `ReminderType`.
///
/// Day-of-month overflow is clamped to the last day of the target month,
/// e.g. the 31st of every month fires on Feb 29 in leap years and on
/// Feb 28 otherwise. When `day_of_month` is not set the day of the
/// anchor (the scheduled date) is used, so a clamped occurrence does not
/// drift the rest of the schedule.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    OneTime,
    Daily {
        interval: u32,
        until: Option<DateTime<Utc>>,
    },
    Weekly {
        interval: u32,
        /// Empty means the weekday of the anchor
        weekdays: Vec<Weekday>,
        until: Option<DateTime<Utc>>,
    },
    Monthly {
        interval: u32,
        day_of_month: Option<u32>,
        until: Option<DateTime<Utc>>,
    },
    Yearly {
        interval: u32,
        day_of_month: Option<u32>,
        until: Option<DateTime<Utc>>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NextRun {
    At(DateTime<Utc>),
    /// There will be no more occurrences
    Exhausted,
}

fn invalid(msg: &str) -> RecurrenceError {
    RecurrenceError::InvalidPattern(msg.to_string())
}

fn weekday_from_index(wday: u32) -> Result<Weekday, RecurrenceError> {
    match wday {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        _ => Err(RecurrenceError::InvalidPattern(format!(
            "Weekday: {} is out of range, expected 0 (Monday) to 6 (Sunday)",
            wday
        ))),
    }
}

impl Recurrence {
    pub fn new(
        reminder_type: ReminderType,
        pattern: Option<&RecurrencePattern>,
        scheduled_date: DateTime<Utc>,
    ) -> Result<Self, RecurrenceError> {
        let default_pattern = RecurrencePattern::default();
        let pattern = pattern.unwrap_or(&default_pattern);

        if reminder_type == ReminderType::OneTime {
            if *pattern != default_pattern {
                return Err(invalid("A one_time reminder does not take a recurrence pattern"));
            }
            return Ok(Self::OneTime);
        }

        let interval = pattern.interval.unwrap_or(1);
        if interval == 0 || interval > MAX_INTERVAL {
            return Err(RecurrenceError::InvalidPattern(format!(
                "Interval must be between 1 and {}",
                MAX_INTERVAL
            )));
        }

        let until = match &pattern.until {
            Some(until) => {
                let until = parse_datetime(until)?;
                if until < scheduled_date {
                    return Err(invalid("Until can not be before the scheduled date"));
                }
                Some(until)
            }
            None => None,
        };

        if pattern.weekdays.is_some() && reminder_type != ReminderType::Weekly {
            return Err(invalid("Weekdays are only valid for weekly reminders"));
        }
        if let Some(day) = pattern.day_of_month {
            if reminder_type != ReminderType::Monthly && reminder_type != ReminderType::Yearly {
                return Err(invalid(
                    "Day of month is only valid for monthly and yearly reminders",
                ));
            }
            if !(1..=31).contains(&day) {
                return Err(invalid("Day of month must be between 1 and 31"));
            }
        }

        let recurrence = match reminder_type {
            ReminderType::Daily => Self::Daily { interval, until },
            ReminderType::Weekly => {
                let mut weekdays = pattern
                    .weekdays
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .map(weekday_from_index)
                    .collect::<Result<Vec<_>, _>>()?;
                weekdays.sort_by_key(|wday| wday.num_days_from_monday());
                weekdays.dedup();
                Self::Weekly {
                    interval,
                    weekdays,
                    until,
                }
            }
            ReminderType::Monthly => Self::Monthly {
                interval,
                day_of_month: pattern.day_of_month,
                until,
            },
            ReminderType::Yearly => Self::Yearly {
                interval,
                day_of_month: pattern.day_of_month,
                until,
            },
            ReminderType::OneTime => Self::OneTime,
        };

        Ok(recurrence)
    }

    pub fn reminder_type(&self) -> ReminderType {
        match self {
            Self::OneTime => ReminderType::OneTime,
            Self::Daily { .. } => ReminderType::Daily,
            Self::Weekly { .. } => ReminderType::Weekly,
            Self::Monthly { .. } => ReminderType::Monthly,
            Self::Yearly { .. } => ReminderType::Yearly,
        }
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::OneTime => None,
            Self::Daily { until, .. }
            | Self::Weekly { until, .. }
            | Self::Monthly { until, .. }
            | Self::Yearly { until, .. } => *until,
        }
    }

    /// The client facing description of this `Recurrence`
    pub fn pattern(&self) -> Option<RecurrencePattern> {
        let until = self.until().map(|until| until.to_rfc3339());
        match self {
            Self::OneTime => None,
            Self::Daily { interval, .. } => Some(RecurrencePattern {
                interval: Some(*interval),
                until,
                ..Default::default()
            }),
            Self::Weekly {
                interval, weekdays, ..
            } => Some(RecurrencePattern {
                interval: Some(*interval),
                weekdays: if weekdays.is_empty() {
                    None
                } else {
                    Some(
                        weekdays
                            .iter()
                            .map(|wday| wday.num_days_from_monday())
                            .collect(),
                    )
                },
                until,
                ..Default::default()
            }),
            Self::Monthly {
                interval,
                day_of_month,
                ..
            }
            | Self::Yearly {
                interval,
                day_of_month,
                ..
            } => Some(RecurrencePattern {
                interval: Some(*interval),
                day_of_month: *day_of_month,
                until,
                ..Default::default()
            }),
        }
    }

    /// The first execution of every reminder is its scheduled date, the
    /// recurrence only kicks in when the reminder is advanced.
    pub fn initial_run(&self, scheduled_date: DateTime<Utc>) -> DateTime<Utc> {
        scheduled_date
    }

    /// Computes the first occurrence strictly after `reference`.
    ///
    /// `anchor` is the scheduled date of the reminder and decides the
    /// local time of day, the default day of month and the week cycle.
    /// `reference` is the previous run. A `OneTime` recurrence is always
    /// exhausted after its initial run.
    pub fn next_run(&self, anchor: DateTime<Utc>, reference: DateTime<Utc>, tz: &Tz) -> NextRun {
        if let Self::OneTime = self {
            return NextRun::Exhausted;
        }

        let anchor = anchor.with_timezone(tz).naive_local();
        let mut cursor = reference;
        loop {
            let next = match self.step(&anchor, cursor, tz) {
                Some(next) => next,
                None => return NextRun::Exhausted,
            };
            if next > reference {
                return match self.until() {
                    Some(until) if next > until => NextRun::Exhausted,
                    _ => NextRun::At(next),
                };
            }
            cursor = next;
        }
    }

    /// Moves one period forward from the local date of `cursor`
    fn step(&self, anchor: &NaiveDateTime, cursor: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
        let cursor_date = cursor.with_timezone(tz).date_naive();

        let date = match self {
            Self::OneTime => return None,
            Self::Daily { interval, .. } => {
                cursor_date.checked_add_signed(Duration::days(*interval as i64))?
            }
            Self::Weekly {
                interval, weekdays, ..
            } => {
                if weekdays.is_empty() {
                    cursor_date.checked_add_signed(Duration::weeks(*interval as i64))?
                } else {
                    next_weekday_in_cycle(&anchor.date(), cursor_date, *interval, weekdays)?
                }
            }
            Self::Monthly {
                interval,
                day_of_month,
                ..
            } => {
                let (year, month) = add_months(cursor_date.year(), cursor_date.month(), *interval);
                clamped_date(year, month, day_of_month.unwrap_or_else(|| anchor.day()))?
            }
            Self::Yearly {
                interval,
                day_of_month,
                ..
            } => {
                let year = cursor_date.year().checked_add(*interval as i32)?;
                clamped_date(
                    year,
                    anchor.month(),
                    day_of_month.unwrap_or_else(|| anchor.day()),
                )?
            }
        };

        localize(tz, date.and_time(anchor.time()))
    }
}

fn add_months(year: i32, month: u32, months: u32) -> (i32, u32) {
    let total = year * 12 + (month as i32 - 1) + months as i32;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.min(get_month_length(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

fn week_start(date: &NaiveDate) -> NaiveDate {
    *date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Finds the first date after `from` that falls on one of the `weekdays`
/// in a week that is a multiple of `interval` weeks away from the week
/// of the `anchor`. Weeks start on Monday.
fn next_weekday_in_cycle(
    anchor: &NaiveDate,
    from: NaiveDate,
    interval: u32,
    weekdays: &[Weekday],
) -> Option<NaiveDate> {
    let anchor_week = week_start(anchor);
    let mut date = from;
    loop {
        date = date.succ_opt()?;
        if !weekdays.contains(&date.weekday()) {
            continue;
        }
        let weeks = (week_start(&date) - anchor_week).num_days() / 7;
        if weeks >= 0 && weeks % interval as i64 == 0 {
            return Some(date);
        }
    }
}

/// Resolves a local wall clock time to an instant. Ambiguous times pick
/// the earliest instant and times inside a DST gap are moved forward by
/// the length of the gap.
fn localize(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(local + Duration::hours(1))).earliest(),
    };
    resolved.map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::{Europe::Oslo, UTC};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn recurrence(reminder_type: ReminderType, pattern: RecurrencePattern, anchor: DateTime<Utc>) -> Recurrence {
        Recurrence::new(reminder_type, Some(&pattern), anchor).unwrap()
    }

    fn expand(recurrence: &Recurrence, anchor: DateTime<Utc>, count: usize, tz: &Tz) -> Vec<DateTime<Utc>> {
        let mut runs = vec![recurrence.initial_run(anchor)];
        while runs.len() < count {
            match recurrence.next_run(anchor, *runs.last().unwrap(), tz) {
                NextRun::At(next) => runs.push(next),
                NextRun::Exhausted => break,
            }
        }
        runs
    }

    #[test]
    fn one_time_fires_once_at_scheduled_date() {
        let anchor = utc(2024, 3, 1, 0, 0);
        let recurrence = Recurrence::new(ReminderType::OneTime, None, anchor).unwrap();
        assert_eq!(recurrence.initial_run(anchor), anchor);
        assert_eq!(recurrence.next_run(anchor, anchor, &UTC), NextRun::Exhausted);
        assert!(recurrence.pattern().is_none());
    }

    #[test]
    fn weekly_advances_one_week() {
        let anchor = utc(2024, 1, 1, 9, 0);
        let recurrence = Recurrence::new(ReminderType::Weekly, None, anchor).unwrap();
        assert_eq!(recurrence.initial_run(anchor), anchor);
        assert_eq!(
            recurrence.next_run(anchor, anchor, &UTC),
            NextRun::At(utc(2024, 1, 8, 9, 0))
        );
    }

    #[test]
    fn daily_with_interval() {
        let anchor = utc(2024, 2, 27, 18, 30);
        let pattern = RecurrencePattern {
            interval: Some(2),
            ..Default::default()
        };
        let recurrence = recurrence(ReminderType::Daily, pattern, anchor);
        assert_eq!(
            expand(&recurrence, anchor, 4, &UTC),
            vec![
                utc(2024, 2, 27, 18, 30),
                utc(2024, 2, 29, 18, 30),
                utc(2024, 3, 2, 18, 30),
                utc(2024, 3, 4, 18, 30),
            ]
        );
    }

    #[test]
    fn monthly_clamps_to_last_day_of_month_without_drift() {
        let anchor = utc(2024, 1, 31, 9, 0);
        let recurrence = Recurrence::new(ReminderType::Monthly, None, anchor).unwrap();
        assert_eq!(
            expand(&recurrence, anchor, 5, &UTC),
            vec![
                utc(2024, 1, 31, 9, 0),
                utc(2024, 2, 29, 9, 0),
                utc(2024, 3, 31, 9, 0),
                utc(2024, 4, 30, 9, 0),
                utc(2024, 5, 31, 9, 0),
            ]
        );

        let anchor = utc(2023, 1, 31, 9, 0);
        assert_eq!(
            recurrence.next_run(anchor, anchor, &UTC),
            NextRun::At(utc(2023, 2, 28, 9, 0))
        );
    }

    #[test]
    fn monthly_with_explicit_day_of_month() {
        let anchor = utc(2024, 1, 10, 12, 0);
        let pattern = RecurrencePattern {
            interval: Some(3),
            day_of_month: Some(30),
            ..Default::default()
        };
        let recurrence = recurrence(ReminderType::Monthly, pattern, anchor);
        assert_eq!(
            expand(&recurrence, anchor, 4, &UTC),
            vec![
                utc(2024, 1, 10, 12, 0),
                utc(2024, 4, 30, 12, 0),
                utc(2024, 7, 30, 12, 0),
                utc(2024, 10, 30, 12, 0),
            ]
        );
    }

    #[test]
    fn monthly_crosses_year_boundary() {
        let anchor = utc(2024, 11, 15, 8, 0);
        let recurrence = Recurrence::new(ReminderType::Monthly, None, anchor).unwrap();
        assert_eq!(
            expand(&recurrence, anchor, 3, &UTC),
            vec![
                utc(2024, 11, 15, 8, 0),
                utc(2024, 12, 15, 8, 0),
                utc(2025, 1, 15, 8, 0),
            ]
        );
    }

    #[test]
    fn yearly_on_leap_day() {
        let anchor = utc(2024, 2, 29, 7, 0);
        let recurrence = Recurrence::new(ReminderType::Yearly, None, anchor).unwrap();
        assert_eq!(
            expand(&recurrence, anchor, 5, &UTC),
            vec![
                utc(2024, 2, 29, 7, 0),
                utc(2025, 2, 28, 7, 0),
                utc(2026, 2, 28, 7, 0),
                utc(2027, 2, 28, 7, 0),
                utc(2028, 2, 29, 7, 0),
            ]
        );
    }

    #[test]
    fn weekly_on_weekdays_every_other_week() {
        // Monday
        let anchor = utc(2024, 1, 1, 9, 0);
        let pattern = RecurrencePattern {
            interval: Some(2),
            weekdays: Some(vec![4, 0, 2]),
            ..Default::default()
        };
        let recurrence = recurrence(ReminderType::Weekly, pattern, anchor);
        assert_eq!(
            expand(&recurrence, anchor, 5, &UTC),
            vec![
                utc(2024, 1, 1, 9, 0),
                utc(2024, 1, 3, 9, 0),
                utc(2024, 1, 5, 9, 0),
                utc(2024, 1, 15, 9, 0),
                utc(2024, 1, 17, 9, 0),
            ]
        );
        assert_eq!(
            recurrence.pattern().unwrap().weekdays,
            Some(vec![0, 2, 4])
        );
    }

    #[test]
    fn stops_after_until() {
        let anchor = utc(2024, 1, 1, 9, 0);
        let pattern = RecurrencePattern {
            until: Some("2024-01-03T09:00:00Z".into()),
            ..Default::default()
        };
        let recurrence = recurrence(ReminderType::Daily, pattern, anchor);
        assert_eq!(
            expand(&recurrence, anchor, 10, &UTC),
            vec![
                utc(2024, 1, 1, 9, 0),
                utc(2024, 1, 2, 9, 0),
                utc(2024, 1, 3, 9, 0),
            ]
        );
    }

    #[test]
    fn keeps_local_time_across_dst() {
        // 09:00 in Oslo, which is UTC+1 before and UTC+2 after 2024-03-31
        let anchor = utc(2024, 3, 30, 8, 0);
        let recurrence = Recurrence::new(ReminderType::Daily, None, anchor).unwrap();
        assert_eq!(
            expand(&recurrence, anchor, 3, &Oslo),
            vec![
                utc(2024, 3, 30, 8, 0),
                utc(2024, 3, 31, 7, 0),
                utc(2024, 4, 1, 7, 0),
            ]
        );
    }

    #[test]
    fn moves_out_of_dst_gap() {
        // 02:30 in Oslo does not exist on 2024-03-31
        let anchor = utc(2024, 3, 30, 1, 30);
        let recurrence = Recurrence::new(ReminderType::Daily, None, anchor).unwrap();
        assert_eq!(
            expand(&recurrence, anchor, 3, &Oslo),
            vec![
                utc(2024, 3, 30, 1, 30),
                utc(2024, 3, 31, 1, 30),
                utc(2024, 4, 1, 0, 30),
            ]
        );
    }

    #[test]
    fn next_run_is_strictly_after_reference() {
        let anchor = utc(2024, 1, 31, 23, 59);
        let types = vec![
            ReminderType::Daily,
            ReminderType::Weekly,
            ReminderType::Monthly,
            ReminderType::Yearly,
        ];
        for reminder_type in types {
            let recurrence = Recurrence::new(reminder_type, None, anchor).unwrap();
            for tz in &[UTC, Oslo] {
                let mut reference = anchor;
                for _ in 0..50 {
                    match recurrence.next_run(anchor, reference, tz) {
                        NextRun::At(next) => {
                            assert!(next > reference);
                            reference = next;
                        }
                        NextRun::Exhausted => panic!("Recurrence without until got exhausted"),
                    }
                }
            }
        }
    }

    #[test]
    fn next_run_is_deterministic() {
        let anchor = utc(2024, 5, 31, 10, 0);
        let pattern = RecurrencePattern {
            interval: Some(2),
            ..Default::default()
        };
        let recurrence = recurrence(ReminderType::Monthly, pattern, anchor);
        let reference = utc(2024, 9, 30, 10, 0);
        assert_eq!(
            recurrence.next_run(anchor, reference, &Oslo),
            recurrence.next_run(anchor, reference, &Oslo)
        );
    }

    #[test]
    fn rejects_invalid_patterns() {
        let anchor = utc(2024, 1, 1, 9, 0);
        let invalid_patterns = vec![
            (
                ReminderType::Weekly,
                RecurrencePattern {
                    weekdays: Some(vec![7]),
                    ..Default::default()
                },
            ),
            (
                ReminderType::Daily,
                RecurrencePattern {
                    weekdays: Some(vec![1]),
                    ..Default::default()
                },
            ),
            (
                ReminderType::Daily,
                RecurrencePattern {
                    interval: Some(0),
                    ..Default::default()
                },
            ),
            (
                ReminderType::Monthly,
                RecurrencePattern {
                    day_of_month: Some(32),
                    ..Default::default()
                },
            ),
            (
                ReminderType::Weekly,
                RecurrencePattern {
                    day_of_month: Some(3),
                    ..Default::default()
                },
            ),
            (
                ReminderType::OneTime,
                RecurrencePattern {
                    interval: Some(1),
                    ..Default::default()
                },
            ),
            (
                ReminderType::Daily,
                RecurrencePattern {
                    until: Some("2023-12-31".into()),
                    ..Default::default()
                },
            ),
        ];

        for (reminder_type, pattern) in invalid_patterns {
            assert!(matches!(
                Recurrence::new(reminder_type, Some(&pattern), anchor),
                Err(RecurrenceError::InvalidPattern(_))
            ));
        }

        let pattern = RecurrencePattern {
            until: Some("next week".into()),
            ..Default::default()
        };
        assert!(matches!(
            Recurrence::new(ReminderType::Daily, Some(&pattern), anchor),
            Err(RecurrenceError::InvalidDate(_))
        ));
    }

    #[test]
    fn parses_reminder_types() {
        assert_eq!("one_time".parse::<ReminderType>().unwrap(), ReminderType::OneTime);
        assert_eq!("yearly".parse::<ReminderType>().unwrap(), ReminderType::Yearly);
        assert!("hourly".parse::<ReminderType>().is_err());
        assert_eq!(ReminderType::Monthly.to_string(), "monthly");
    }
}
