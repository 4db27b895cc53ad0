//! Calendar month identifiers and date labels.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Duration, Month, OffsetDateTime, macros::format_description};

use crate::Error;

/// A calendar month, written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a year-month from its parts.
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn of(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The current month in the local timezone, falling back to UTC if the
    /// local offset cannot be determined.
    pub fn current() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());

        Self::of(now.date())
    }

    /// Parse a `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidMonth] if `text` is not of the form `YYYY-MM`
    /// with a month between 1 and 12.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year_text, month_text) = text.trim().split_once('-').ok_or_else(invalid)?;

        if year_text.len() != 4 || month_text.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year_text.parse().map_err(|_| invalid())?;
        let month_number: u8 = month_text.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month_number).map_err(|_| invalid())?;

        Ok(Self::new(year, month))
    }

    /// The year.
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The month of the year.
    pub const fn month(self) -> Month {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(self) -> Date {
        let (year, month) = match self.month {
            Month::December => (self.year + 1, Month::January),
            month => (self.year, month.next()),
        };

        Date::from_calendar_date(year, month, 1)
            .map(|first_of_next| first_of_next - Duration::days(1))
            .unwrap_or(Date::MAX)
    }

    /// Whether `date` falls inside this month.
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month before this one.
    pub fn previous(self) -> Self {
        Self::of(self.first_day() - Duration::days(1))
    }

    /// The month after this one.
    pub fn next(self) -> Self {
        Self::of(self.last_day() + Duration::days(1))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month as u8).cmp(&(other.year, other.month as u8))
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        YearMonth::parse(s)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        YearMonth::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Format a date for a table row, e.g. `Jan 05, 2024`.
pub fn format_row_date(date: Date) -> String {
    date.format(format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Format a date as a short chart axis label, e.g. `Jan 05`.
pub fn format_day_label(date: Date) -> String {
    date.format(format_description!("[month repr:short] [day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod year_month_tests {
    use time::{Month, macros::date};

    use crate::{
        Error,
        month::{YearMonth, format_day_label, format_row_date, parse_date},
    };

    #[test]
    fn parse_round_trips_through_display() {
        let month = YearMonth::parse("2024-02").unwrap();

        assert_eq!(month, YearMonth::new(2024, Month::February));
        assert_eq!(month.to_string(), "2024-02");
    }

    #[test]
    fn parse_rejects_invalid_months() {
        for text in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "january"] {
            assert_eq!(
                YearMonth::parse(text),
                Err(Error::InvalidMonth(text.to_owned())),
                "want error for {text:?}"
            );
        }
    }

    #[test]
    fn bounds_cover_whole_month() {
        let month = YearMonth::new(2024, Month::February);

        assert_eq!(month.first_day(), date!(2024 - 02 - 01));
        assert_eq!(month.last_day(), date!(2024 - 02 - 29));
        assert!(month.contains(date!(2024 - 02 - 15)));
        assert!(!month.contains(date!(2024 - 03 - 01)));
        assert!(!month.contains(date!(2023 - 02 - 15)));
    }

    #[test]
    fn previous_and_next_cross_year_boundaries() {
        let january = YearMonth::new(2024, Month::January);

        assert_eq!(january.previous(), YearMonth::new(2023, Month::December));
        assert_eq!(january.previous().next(), january);
        assert_eq!(
            YearMonth::new(2023, Month::December).next(),
            YearMonth::new(2024, Month::January)
        );
    }

    #[test]
    fn deserializes_from_json_string() {
        let month: YearMonth = serde_json::from_str("\"2024-01\"").unwrap();

        assert_eq!(month, YearMonth::new(2024, Month::January));
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(parse_date("2024-01-05"), Ok(date!(2024 - 01 - 05)));
        assert_eq!(
            parse_date("2024-02-30"),
            Err(Error::InvalidDate("2024-02-30".to_owned()))
        );
    }

    #[test]
    fn formats_labels() {
        assert_eq!(format_row_date(date!(2024 - 01 - 05)), "Jan 05, 2024");
        assert_eq!(format_day_label(date!(2024 - 01 - 05)), "Jan 05");
    }
}
