use chrono::{Datelike, Duration, NaiveDate};

use crate::{CoachError, CoachResult};

/// The budgeting month containing `as_of`, as the pacing engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub day_of_month: u32,
    pub days_in_month: u32,
}

impl MonthWindow {
    pub fn containing(as_of: NaiveDate) -> Self {
        let days = days_in_month(as_of.year(), as_of.month());
        let start = as_of.with_day(1).unwrap_or(as_of);
        let end = as_of.with_day(days).unwrap_or(as_of);
        Self {
            start,
            end,
            day_of_month: as_of.day(),
            days_in_month: days,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn month_key(&self) -> String {
        format_month_key(&self.start)
    }
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Saturates at `NaiveDate::MIN` instead of overflowing.
pub fn lookback_start(as_of: NaiveDate, lookback_days: i64) -> NaiveDate {
    Duration::try_days(lookback_days.max(0))
        .and_then(|span| as_of.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    if !looks_like_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Bank exports use either ISO dates or US-style `M/D/YYYY`.
pub fn parse_statement_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Some(date) = trimmed.get(..10).and_then(parse_transaction_date) {
        return Some(date);
    }
    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
}

pub fn parse_iso_date_arg(value: &str, field_name: &str, command: &str) -> CoachResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(CoachError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with a real calendar date."),
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CoachError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with valid calendar values."),
            Some(command),
        )
    })
}

pub fn parse_month_arg(value: &str, command: &str) -> CoachResult<String> {
    parse_month_start(value, command).map(|start| format_month_key(&start))
}

/// First day of a `YYYY-MM` month argument.
pub fn parse_month_start(value: &str, command: &str) -> CoachResult<NaiveDate> {
    let candidate = format!("{value}-01");
    if value.len() != 7 || !looks_like_iso_date(&candidate) {
        return Err(CoachError::invalid_argument_for_command(
            "`month` must use YYYY-MM format.",
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d").map_err(|_| {
        CoachError::invalid_argument_for_command(
            "`month` must use YYYY-MM format with a real calendar month.",
            Some(command),
        )
    })
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
