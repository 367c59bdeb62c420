//! Per-locale UI message catalogs. Each supported locale has one YAML
//! catalog (`locales/<code>.yaml`) holding the localized copy for the landing
//! page, the blog chrome, and the not-found page. All catalogs are loaded at
//! startup; a missing or unparsable catalog aborts the build rather than
//! surfacing half-translated pages later.

use crate::locale::{Locale, Locales};
use gtmpl_value::Value;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The message catalogs for every supported locale.
pub struct Messages {
    catalogs: HashMap<String, Catalog>,
}

impl Messages {
    /// Loads `<code>.yaml` from `directory` for every supported locale.
    pub fn load(directory: &Path, locales: &Locales) -> Result<Messages> {
        let mut catalogs = HashMap::with_capacity(locales.len());
        for locale in locales.iter() {
            let path = directory.join(format!("{}.yaml", locale.code()));
            catalogs.insert(locale.code().to_owned(), Catalog::load(&path)?);
        }
        Ok(Messages { catalogs })
    }

    /// The catalog for a supported locale. Every registry member's catalog
    /// was loaded in [`Messages::load`], so this only fails for a locale
    /// outside the registry the catalogs were loaded for.
    pub fn catalog(&self, locale: &Locale) -> Result<&Catalog> {
        self.catalogs
            .get(locale.code())
            .ok_or_else(|| Error::MissingCatalog(locale.code().to_owned()))
    }
}

/// One locale's message catalog: a tree of YAML mappings with string leaves.
pub struct Catalog {
    root: Yaml,
}

impl Catalog {
    fn load(path: &Path) -> Result<Catalog> {
        let file = File::open(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        let root: Yaml =
            serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?;
        Ok(Catalog { root })
    }

    /// Exact lookup of a dotted key (e.g. `blog.title`). Used for values
    /// that feed page metadata, where a missing message must fail the build
    /// instead of rendering an empty tag.
    pub fn get(&self, key: &str) -> Result<&str> {
        let mut node = &self.root;
        for part in key.split('.') {
            node = match node {
                Yaml::Mapping(mapping) => mapping
                    .get(&Yaml::String(part.to_owned()))
                    .ok_or_else(|| Error::MissingMessage(key.to_owned()))?,
                _ => return Err(Error::MissingMessage(key.to_owned())),
            };
        }
        match node {
            Yaml::String(s) => Ok(s),
            _ => Err(Error::MissingMessage(key.to_owned())),
        }
    }

    /// Converts the whole catalog into a template value; templates receive it
    /// as `t` (e.g. `{{.t.blog.title}}`).
    pub fn to_value(&self) -> Value {
        yaml_to_value(&self.root)
    }
}

fn yaml_to_value(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or_default()),
        },
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => {
            Value::Array(seq.iter().map(yaml_to_value).collect())
        }
        Yaml::Mapping(mapping) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            for (key, value) in mapping.iter() {
                if let Yaml::String(key) = key {
                    m.insert(key.clone(), yaml_to_value(value));
                }
            }
            Value::Object(m)
        }
    }
}

/// Represents the result of a message-catalog operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or consulting message catalogs.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems opening a catalog file.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when a catalog file isn't valid YAML.
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when no catalog was loaded for the requested locale.
    MissingCatalog(String),

    /// Returned when a dotted key has no string value in the catalog.
    MissingMessage(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "Opening catalog `{}`: {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "Parsing catalog `{}`: {}", path.display(), err)
            }
            Error::MissingCatalog(code) => {
                write!(f, "No message catalog loaded for locale `{}`", code)
            }
            Error::MissingMessage(key) => {
                write!(f, "No message for key `{}`", key)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::MissingCatalog(_) => None,
            Error::MissingMessage(_) => None,
        }
    }
}
