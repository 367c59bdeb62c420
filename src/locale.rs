//! Defines the [`Locale`] and [`Locales`] types. [`Locales`] is the locale
//! registry: the closed set of supported locales, the single designated
//! default, and the always-prefix routing policy (every route carries an
//! explicit locale segment; there is no prefixless fallback). The registry is
//! built once from the project configuration and passed by reference to every
//! component that needs it.

use chrono::Locale as ChronoLocale;
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;

/// The date display pattern used when a locale doesn't configure its own:
/// day, full month name, year.
const DEFAULT_DATE_FORMAT: &str = "%-d %B %Y";

/// Declares one supported locale in the project file. Resolved into a
/// [`Locale`] by [`Locales::new`].
#[derive(Clone, Debug, Deserialize)]
pub struct LocaleSpec {
    /// The locale identifier as it appears in routes (e.g. `en-GB`).
    pub code: String,

    /// Optional strftime-style pattern for date displays. Defaults to
    /// [`DEFAULT_DATE_FORMAT`].
    #[serde(default)]
    pub date_format: Option<String>,
}

/// One supported locale. Instances are owned by the [`Locales`] registry;
/// everything else borrows them from it.
#[derive(Clone, Debug)]
pub struct Locale {
    code: String,
    date_format: String,
    chrono_locale: ChronoLocale,
}

impl Locale {
    /// The locale identifier, e.g. `en-GB`. Doubles as the route prefix
    /// segment.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub(crate) fn date_format(&self) -> &str {
        &self.date_format
    }

    pub(crate) fn chrono_locale(&self) -> ChronoLocale {
        self.chrono_locale
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.code.fmt(f)
    }
}

impl PartialEq for Locale {
    /// Locales are compared by identifier; the formatting fields are derived
    /// from it.
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Locale {}

/// The locale registry.
#[derive(Clone, Debug)]
pub struct Locales {
    locales: Vec<Locale>,
    default_index: usize,
}

impl Locales {
    /// Builds the registry from the configured locale list and default
    /// identifier. Fails on an empty list, a duplicate identifier, a default
    /// outside the list, or an identifier with no matching chrono formatting
    /// locale (identifiers map to chrono's `en_GB`-style names).
    pub fn new(specs: Vec<LocaleSpec>, default_code: &str) -> Result<Locales> {
        if specs.is_empty() {
            return Err(Error::Empty);
        }

        let mut locales: Vec<Locale> = Vec::with_capacity(specs.len());
        for spec in specs {
            if locales.iter().any(|l| l.code == spec.code) {
                return Err(Error::Duplicate(spec.code));
            }
            let chrono_locale =
                ChronoLocale::try_from(spec.code.replace('-', "_").as_str())
                    .map_err(|_| Error::UnknownDateLocale(spec.code.clone()))?;
            locales.push(Locale {
                code: spec.code,
                date_format: spec
                    .date_format
                    .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_owned()),
                chrono_locale,
            });
        }

        match locales.iter().position(|l| l.code == default_code) {
            None => Err(Error::UnsupportedDefault(default_code.to_owned())),
            Some(default_index) => Ok(Locales {
                locales,
                default_index,
            }),
        }
    }

    /// The supported locales in configuration order.
    pub fn iter(&self) -> std::slice::Iter<Locale> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// The designated default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default_index]
    }

    /// Whether `candidate` names a supported locale.
    pub fn is_supported(&self, candidate: &str) -> bool {
        self.get(candidate).is_some()
    }

    /// Validation plus lookup. Callers that get `None` for a request-supplied
    /// identifier must treat the request as not-found rather than falling
    /// back to another locale.
    pub fn get(&self, candidate: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code == candidate)
    }
}

/// Represents the result of building the locale registry.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building the locale registry.
#[derive(Debug)]
pub enum Error {
    /// Returned when the configured locale list is empty.
    Empty,

    /// Returned when the same identifier is configured twice.
    Duplicate(String),

    /// Returned when the configured default is not a member of the locale
    /// list.
    UnsupportedDefault(String),

    /// Returned when an identifier has no matching chrono formatting locale,
    /// which would leave its dates unformattable.
    UnknownDateLocale(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "No locales configured"),
            Error::Duplicate(code) => {
                write!(f, "Locale `{}` is configured more than once", code)
            }
            Error::UnsupportedDefault(code) => write!(
                f,
                "Default locale `{}` is not in the configured locale list",
                code
            ),
            Error::UnknownDateLocale(code) => write!(
                f,
                "Locale `{}` has no matching date-formatting locale",
                code
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Registry fixture shared by tests across the crate: the two locales of the
/// reference deployment, `en-GB` default.
#[cfg(test)]
pub(crate) fn test_registry() -> Locales {
    Locales::new(
        vec![
            LocaleSpec {
                code: "en-GB".to_owned(),
                date_format: None,
            },
            LocaleSpec {
                code: "pt-BR".to_owned(),
                date_format: Some("%-d de %B de %Y".to_owned()),
            },
        ],
        "en-GB",
    )
    .unwrap()
}
