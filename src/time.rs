//! Reference dates and age derivation.
//!
//! Ages are never stored: every query recomputes them against the date
//! handed out by a [`Clock`]. Production uses [`SystemClock`]; tests pin the
//! date with [`FixedClock`] so results stay deterministic.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for age computation.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The reference date for the current query.
    fn today(&self) -> NaiveDate;
}

/// Clock reading the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Pins the clock to `year-month-day`, or `None` if that date does not exist.
    #[must_use]
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whole years elapsed between `birthdate` and `today`.
///
/// A person turns a year older on the anniversary of their birth month and
/// day. Someone born on February 29th ages on March 1st in non-leap years.
/// Birthdates after `today` yield 0.
///
/// # Examples
///
/// ```
/// use alertnet::time::age_on;
/// use chrono::NaiveDate;
///
/// let born = NaiveDate::from_ymd_opt(2010, 6, 15).unwrap();
/// let day_before = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();
/// let birthday = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
/// assert_eq!(age_on(born, day_before), 9);
/// assert_eq!(age_on(born, birthday), 10);
/// ```
#[must_use]
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    if birthdate >= today {
        return 0;
    }

    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_counts_whole_years() {
        assert_eq!(age_on(date(1984, 3, 6), date(2024, 3, 5)), 39);
        assert_eq!(age_on(date(1984, 3, 6), date(2024, 3, 6)), 40);
        assert_eq!(age_on(date(1984, 3, 6), date(2024, 12, 31)), 40);
    }

    #[test]
    fn test_age_future_birthdate_is_zero() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), 0);
        assert_eq!(age_on(date(2024, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_age_leap_day() {
        let born = date(2004, 2, 29);
        assert_eq!(age_on(born, date(2021, 2, 28)), 16);
        assert_eq!(age_on(born, date(2021, 3, 1)), 17);
        assert_eq!(age_on(born, date(2024, 2, 29)), 20);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::ymd(2024, 6, 1).unwrap();
        assert_eq!(clock.today(), date(2024, 6, 1));
        assert!(FixedClock::ymd(2023, 2, 29).is_none());
    }
}
