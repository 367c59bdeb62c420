//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output static site: loading the message
//! catalogs and the content store, rendering every localized page
//! ([`crate::write`]), copying theme and post assets, and generating the
//! sitemap and the per-locale Atom feeds.

use crate::config::Config;
use crate::feed::{self, Error as FeedError, FeedConfig};
use crate::messages::{Error as MessageError, Messages};
use crate::sitemap;
use crate::store::{Error as StoreError, Store};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object. This calls into
/// [`Store::load`] and [`Writer::write_site`] which do the heavy-lifting;
/// this function also copies static assets and emits the machine-readable
/// outputs (sitemap, feeds, root redirect).
pub fn build_site(config: &Config) -> Result<()> {
    log::info!("loading message catalogs");
    let messages = Messages::load(&config.locales_directory, &config.locales)?;

    log::info!(
        "loading content store from `{}`",
        config.posts_source_directory.display()
    );
    let store = Store::load(
        &config.posts_source_directory,
        &config.locales,
        &config.scheme,
        config.threads,
    )?;
    log::info!("loaded {} posts", store.slugs().len());

    // Parse the template stacks.
    let home_template = parse_template(config.home_template.iter())?;
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;
    let not_found_template = parse_template(config.not_found_template.iter())?;

    // Blow away the old per-locale and asset directories so renamed posts
    // and locales don't leave stale pages behind. We deliberately don't
    // delete the whole output directory in case the user accidentally
    // passes the wrong one.
    for locale in config.locales.iter() {
        rmdir(&config.output_directory.join(locale.code()))?;
    }
    rmdir(&config.output_directory.join("static"))?;
    rmdir(&config.output_directory.join("assets"))?;

    log::info!("rendering pages");
    let writer = Writer {
        home_template: &home_template,
        index_template: &index_template,
        posts_template: &posts_template,
        not_found_template: &not_found_template,
        locales: &config.locales,
        messages: &messages,
        scheme: &config.scheme,
        output_directory: &config.output_directory,
    };
    writer.write_site(&store)?;

    // copy the theme's static directory
    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.output_directory.join("static"),
        )?;
    }

    // copy bundled post assets to their locale-independent home
    let assets_directory = config.output_directory.join("assets").join("posts");
    for asset in store.assets() {
        let target = assets_directory
            .join(&asset.slug)
            .join(&asset.relative_path);
        // asset targets always sit below `assets/posts/<slug>/`
        std::fs::create_dir_all(target.parent().unwrap())?;
        std::fs::copy(&asset.source, &target)?;
    }

    log::info!("writing sitemap");
    let entries = sitemap::entries(&store, &config.locales, &config.scheme)?;
    sitemap::write_sitemap(
        &entries,
        File::create(config.output_directory.join("sitemap.xml"))?,
    )?;

    log::info!("writing feeds");
    for locale in config.locales.iter() {
        feed::write_feed(
            &FeedConfig {
                title: config.title.clone(),
                author: config.author.clone(),
                home_page: config.scheme.home(locale),
            },
            locale,
            &store.posts(locale)?,
            File::create(
                config
                    .output_directory
                    .join(locale.code())
                    .join("feed.atom"),
            )?,
        )?;
    }

    // the root URL has no locale segment; serve a redirect to the
    // default-locale home page
    write_redirect(config)?;

    // copy the default locale's 404 page to the root for static hosts that
    // only look there
    let _ = std::fs::copy(
        config
            .output_directory
            .join(config.locales.default_locale().code())
            .join("404.html"),
        config.output_directory.join("404.html"),
    )?;

    Ok(())
}

fn write_redirect(config: &Config) -> Result<()> {
    use std::io::Write;
    let home = config.scheme.home(config.locales.default_locale());
    let mut file = File::create(config.output_directory.join("index.html"))?;
    write!(
        file,
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"0; url={home}\">\n\
         <link rel=\"canonical\" href=\"{home}\">\n\
         </head>\n\
         <body><a href=\"{home}\">{home}</a></body>\n\
         </html>\n",
        home = home
    )?;
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(
                &src.join(entry.file_name()),
                &dst.join(entry.file_name()),
            )?;
        } else {
            std::fs::copy(
                src.join(entry.file_name()),
                dst.join(entry.file_name()),
            )?;
        }
    }

    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(
    template_files: impl Iterator<Item = P>,
) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during catalog or
/// content loading, writing pages, cleaning output directories, parsing
/// template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading message catalogs.
    Message(MessageError),

    /// Returned for errors loading or listing the content store.
    Store(StoreError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feeds.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(err) => err.fmt(f),
            Error::Store(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Message(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<MessageError> for Error {
    /// Converts [`MessageError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: MessageError) -> Error {
        Error::Message(err)
    }
}

impl From<StoreError> for Error {
    /// Converts [`StoreError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: StoreError) -> Error {
        Error::Store(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    fn build_testdata(output: &Path) {
        let config = Config::from_project_file(
            Path::new("./testdata/site/wordhord.yaml"),
            output,
            Some(1),
        )
        .unwrap();
        build_site(&config).unwrap();
    }

    #[test]
    fn test_build_site_end_to_end() {
        let output = tempfile::tempdir().unwrap();
        build_testdata(output.path());

        // every localized page, for every locale
        for code in &["en-GB", "pt-BR"] {
            for page in &[
                "index.html",
                "404.html",
                "feed.atom",
                "blog/index.html",
                "blog/hello-world/index.html",
                "blog/second-post/index.html",
            ] {
                let path = output.path().join(code).join(page);
                assert!(path.is_file(), "missing {}", path.display());
            }
        }

        // root artifacts
        for page in &["index.html", "404.html", "sitemap.xml"] {
            assert!(output.path().join(page).is_file(), "missing {}", page);
        }

        // post assets are copied once, locale-independent
        assert!(output
            .path()
            .join("assets/posts/hello-world/hero.svg")
            .is_file());

        // theme static files come along
        assert!(output.path().join("static/site.css").is_file());
    }

    #[test]
    fn test_rendered_pages_are_localized() {
        let output = tempfile::tempdir().unwrap();
        build_testdata(output.path());

        let en = std::fs::read_to_string(
            output.path().join("en-GB/blog/hello-world/index.html"),
        )
        .unwrap();
        assert!(en.contains("27 November 2023"), "got: {}", en);
        assert!(en.contains("lang=\"en-GB\""));

        let pt = std::fs::read_to_string(
            output.path().join("pt-BR/blog/hello-world/index.html"),
        )
        .unwrap();
        assert!(pt.contains("27 de novembro de 2023"), "got: {}", pt);
        assert!(pt.contains("lang=\"pt-BR\""));
    }

    #[test]
    fn test_index_is_ordered_by_published_date_descending() {
        let output = tempfile::tempdir().unwrap();
        build_testdata(output.path());

        let index = std::fs::read_to_string(
            output.path().join("en-GB/blog/index.html"),
        )
        .unwrap();
        let second = index
            .find("/blog/second-post/")
            .expect("second-post link in index");
        let hello = index
            .find("/blog/hello-world/")
            .expect("hello-world link in index");
        // second-post (2024) was published after hello-world (2023)
        assert!(second < hello, "got: {}", index);
    }

    #[test]
    fn test_redirect_targets_the_default_locale() {
        let output = tempfile::tempdir().unwrap();
        build_testdata(output.path());

        let redirect =
            std::fs::read_to_string(output.path().join("index.html"))
                .unwrap();
        assert!(
            redirect.contains("url=https://example.org/en-GB/"),
            "got: {}",
            redirect
        );
    }
}
