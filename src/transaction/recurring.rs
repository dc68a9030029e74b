//! Recurring transaction intervals and next-occurrence calculation.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// The date of the occurrence after `date`.
    ///
    /// Monthly and yearly steps that land on a day the target month does not
    /// have are clamped to the last day of that month, e.g. Jan 31 steps to
    /// Feb 28 (or 29), and Feb 29 steps to Feb 28 of a common year.
    ///
    /// Returns `None` if the next date is outside of the supported date range.
    pub fn next_date(self, date: Date) -> Option<Date> {
        match self {
            Self::Daily => date.checked_add(Duration::days(1)),
            Self::Weekly => date.checked_add(Duration::weeks(1)),
            Self::Monthly => {
                let (year, month) = match date.month() {
                    Month::December => (date.year().checked_add(1)?, Month::January),
                    month => (date.year(), month.next()),
                };
                clamped_date(year, month, date.day())
            }
            Self::Yearly => clamped_date(date.year().checked_add(1)?, date.month(), date.day()),
        }
    }
}

fn clamped_date(year: i32, month: Month, day: u8) -> Option<Date> {
    let day = day.min(month.length(year));

    Date::from_calendar_date(year, month, day).ok()
}

impl Display for RecurringInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurringInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            other => Err(format!("unknown recurring interval {other:?}")),
        }
    }
}

impl ToSql for RecurringInterval {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecurringInterval {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}
