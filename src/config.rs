//! Project configuration. A project is described by a `wordhord.yaml` file
//! (discovered by walking up from the invocation directory) plus a theme
//! file (`theme/theme.yaml`). Both are resolved into one immutable
//! [`Config`], constructed once at startup and passed by reference to every
//! consuming component, so the locale list, the default locale, and the site
//! root each live in exactly one place.

use crate::locale::{LocaleSpec, Locales};
use crate::urls::UrlScheme;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The project file name searched for in the invocation directory and its
/// ancestors.
pub const PROJECT_FILE: &str = "wordhord.yaml";

#[derive(Deserialize)]
struct Project {
    /// The absolute base URL for the deployed site. Required: without it
    /// every URL in page metadata, the feeds, and the sitemap would be
    /// relative or malformed, so a missing or non-absolute value is a
    /// configuration error (deserializing through [`Url`] enforces
    /// absoluteness).
    site_root: Url,

    title: String,

    #[serde(default)]
    author: Option<Author>,

    locales: Vec<LocaleSpec>,
    default_locale: String,
}

/// The site author, used for feed attribution.
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Theme {
    home_template: Vec<PathBuf>,
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
    not_found_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub author: Option<Author>,
    pub locales: Locales,
    pub scheme: UrlScheme,
    pub posts_source_directory: PathBuf,
    pub locales_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub home_template: Vec<PathBuf>,
    pub index_template: Vec<PathBuf>,
    pub posts_template: Vec<PathBuf>,
    pub not_found_template: Vec<PathBuf>,
    pub output_directory: PathBuf,
    pub threads: usize,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first match.
    pub fn from_directory(
        dir: &Path,
        output_directory: &Path,
        threads: Option<usize>,
    ) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory, threads) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match path.parent().and_then(Path::parent) {
                Some(dir) => {
                    Config::from_directory(dir, output_directory, threads)
                }
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
        threads: Option<usize>,
    ) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                let locales =
                    Locales::new(project.locales, &project.default_locale)?;
                Ok(Config {
                    scheme: UrlScheme::new(&project.site_root),
                    title: project.title,
                    author: project.author,
                    locales,
                    posts_source_directory: project_root.join("posts"),
                    locales_directory: project_root.join("locales"),
                    static_source_directory: theme_dir.join("static"),
                    home_template: join_all(&theme_dir, theme.home_template),
                    index_template: join_all(&theme_dir, theme.index_template),
                    posts_template: join_all(&theme_dir, theme.posts_template),
                    not_found_template: join_all(
                        &theme_dir,
                        theme.not_found_template,
                    ),
                    output_directory: output_directory.to_owned(),
                    threads: match threads {
                        None => num_cpus::get(),
                        Some(threads) => threads,
                    },
                })
            }
        }
    }
}

fn join_all(theme_dir: &Path, relative: Vec<PathBuf>) -> Vec<PathBuf> {
    relative
        .iter()
        .map(|relpath| theme_dir.join(relpath))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_testdata_project() -> Result<()> {
        let config = Config::from_project_file(
            Path::new("./testdata/site/wordhord.yaml"),
            Path::new("/tmp/out"),
            Some(1),
        )?;
        assert_eq!("Rodrigo Miranda", config.title);
        assert_eq!("https://example.org/", config.scheme.root().as_str());
        assert_eq!(2, config.locales.len());
        assert_eq!("en-GB", config.locales.default_locale().code());
        assert_eq!(
            PathBuf::from("./testdata/site/posts"),
            config.posts_source_directory
        );
        assert_eq!(1, config.threads);
        assert_eq!(2, config.posts_template.len());
        Ok(())
    }

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        // the project file sits two levels above the starting directory
        let config = Config::from_directory(
            Path::new("./testdata/site/posts/hello-world"),
            Path::new("/tmp/out"),
            Some(1),
        )?;
        assert_eq!("Rodrigo Miranda", config.title);
        Ok(())
    }

    #[test]
    fn test_missing_project_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_directory(
            dir.path(),
            Path::new("/tmp/out"),
            None
        )
        .is_err());
    }

    #[test]
    fn test_relative_site_root_is_rejected() {
        let result: std::result::Result<Project, _> = serde_yaml::from_str(
            "site_root: /just/a/path\n\
             title: t\n\
             locales: [{code: en-GB}]\n\
             default_locale: en-GB\n",
        );
        assert!(result.is_err());
    }
}
