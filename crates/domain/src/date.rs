use chrono::prelude::*;
use chrono_tz::Tz;
use std::convert::TryFrom;

/// Parses a `YYYY-MM-DD` calendar date (leading zeros optional).
/// An RFC 3339 timestamp is also accepted, in which case the calendar date
/// it falls on in the given timezone is used.
pub fn parse_date(datestr: &str, tz: &Tz) -> anyhow::Result<NaiveDate> {
    let datestr = datestr.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(datestr) {
        let date = datetime.with_timezone(tz).date_naive();
        is_valid_date(&format_date(&date))?;
        return Ok(date);
    }
    let (year, month, day) = is_valid_date(datestr)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| anyhow::Error::msg(datestr.to_string()))
}

pub fn is_valid_date(datestr: &str) -> anyhow::Result<(i32, u32, u32)> {
    let dates = datestr.split('-').collect::<Vec<_>>();
    if dates.len() != 3 {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    let (year, month, day) = match (
        dates[0].parse::<i32>(),
        dates[1].parse::<u32>(),
        dates[2].parse::<u32>(),
    ) {
        (Ok(year), Ok(month), Ok(day)) => (year, month, day),
        _ => return Err(anyhow::Error::msg(datestr.to_string())),
    };

    if !(1970..=2100).contains(&year) || !(1..=12).contains(&month) {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    let month_length = get_month_length(year, month);

    if day < 1 || day > month_length {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    Ok((year, month, day))
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Moves `date` forward by `months` calendar months. When the day of month
/// does not exist in the target month it is clamped to the last day of that
/// month, e.g. Jan 31 + 1 month = Feb 29 (leap year) or Feb 28.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let month0 = date.month0() as i64 + months as i64;
    let year = date.year() as i64 + month0.div_euclid(12);
    let month = (month0.rem_euclid(12) + 1) as u32;
    let year = i32::try_from(year).ok()?;
    let day = date.day().min(get_month_length(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of whole calendar months from `from` to `to`, ignoring days.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

pub fn format_date(date: &NaiveDate) -> String {
    format!("{}-{:02}-{:02}", date.year(), date.month(), date.day())
}
