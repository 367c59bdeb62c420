//! Locale-aware date display. Published dates are stored as `%Y-%m-%d`
//! calendar dates; pages render them with the locale's configured pattern and
//! chrono formatting locale (month names in the locale's language).

use crate::locale::Locale;
use chrono::NaiveDate;
use std::fmt;

/// The calendar-date format used at rest (frontmatter, sitemap, `<time>`
/// attributes).
pub const SOURCE_FORMAT: &str = "%Y-%m-%d";

/// Parses `iso` as a `%Y-%m-%d` date and renders it for `locale`. Pure; the
/// only failure mode is an invalid date input.
pub fn format_date(iso: &str, locale: &Locale) -> Result<String> {
    Ok(format(NaiveDate::parse_from_str(iso, SOURCE_FORMAT)?, locale))
}

/// Renders an already-parsed date for `locale`. Cannot fail: the pattern and
/// formatting locale were validated when the registry was built.
pub fn format(date: NaiveDate, locale: &Locale) -> String {
    date.format_localized(locale.date_format(), locale.chrono_locale())
        .to_string()
}

/// Represents the result of a date-display operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a date display.
#[derive(Debug)]
pub enum Error {
    /// Returned when the input is not a valid `%Y-%m-%d` date.
    DateParse(chrono::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DateParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DateParse(err) => Some(err),
        }
    }
}

impl From<chrono::ParseError> for Error {
    /// Converts a [`chrono::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator for date parsing.
    fn from(err: chrono::ParseError) -> Error {
        Error::DateParse(err)
    }
}
