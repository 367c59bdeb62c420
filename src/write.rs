//! Responsible for templating and writing the site's HTML pages to disk:
//! for every supported locale, a home page, a blog index, one page per post
//! in the static parameter space, and a not-found page.

use crate::datefmt;
use crate::locale::{Locale, Locales};
use crate::messages::{self, Messages};
use crate::page::{resolve_post_page, PostPage};
use crate::params::StaticParams;
use crate::post::Post;
use crate::store::{self, Store};
use crate::urls::UrlScheme;
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Writes rendered pages to disk from a loaded [`Store`].
pub struct Writer<'a> {
    /// The template for the localized home (landing) page.
    pub home_template: &'a Template,

    /// The template for the localized blog index.
    pub index_template: &'a Template,

    /// The template for single-post pages.
    pub posts_template: &'a Template,

    /// The template for the localized not-found page.
    pub not_found_template: &'a Template,

    pub locales: &'a Locales,
    pub messages: &'a Messages,
    pub scheme: &'a UrlScheme,

    /// The root output directory. Localized pages land under
    /// `{output_directory}/{locale}/`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders the whole site: per-locale chrome pages plus one page per
    /// pair in the closed static parameter space. A pair that fails to
    /// resolve means a missing translation, which fails the build.
    pub fn write_site(&self, store: &Store) -> Result<()> {
        let params = StaticParams::new(store, self.locales);

        for locale in self.locales.iter() {
            self.write_home(locale)?;
            self.write_index(locale, store)?;
            self.write_not_found(locale)?;
        }

        for (locale_code, slug) in params.iter() {
            let page = resolve_post_page(
                store,
                self.locales,
                &params,
                self.scheme,
                locale_code,
                slug,
            )
            .map_err(|_| Error::MissingTranslation {
                locale: locale_code.clone(),
                slug: slug.clone(),
            })?;
            self.write_post(&page)?;
        }

        Ok(())
    }

    fn write_home(&self, locale: &Locale) -> Result<()> {
        let value = self.page_value(locale, "")?;
        self.render(self.home_template, &self.page_path(locale, ""), value)
    }

    fn write_index(&self, locale: &Locale, store: &Store) -> Result<()> {
        let mut posts = store.posts(locale)?;
        // the index's presentation order: newest first, slug breaks ties
        posts.sort_by(|a, b| {
            b.metadata
                .published_date
                .cmp(&a.metadata.published_date)
                .then_with(|| a.slug.cmp(&b.slug))
        });

        let mut value = self.page_value(locale, "/blog")?;
        insert(
            &mut value,
            "posts",
            Value::Array(
                posts.iter().map(|post| item_value(post, locale)).collect(),
            ),
        );
        self.render(
            self.index_template,
            &self.page_path(locale, "/blog"),
            value,
        )
    }

    fn write_post(&self, page: &PostPage) -> Result<()> {
        let href = format!("/blog/{}", page.post.slug);
        let mut value = self.page_value(page.locale, &href)?;
        if let Value::Object(extra) = page.to_value() {
            // page-specific keys win over the shared ones
            if let Value::Object(base) = &mut value {
                base.extend(extra);
            }
        }
        self.render(
            self.posts_template,
            &self.page_path(page.locale, &href),
            value,
        )
    }

    fn write_not_found(&self, locale: &Locale) -> Result<()> {
        let value = self.page_value(locale, "")?;
        self.render(
            self.not_found_template,
            &self
                .output_directory
                .join(locale.code())
                .join("404.html"),
            value,
        )
    }

    /// The shared template context for a page at `href` in `locale`:
    /// `locale`, the message catalog as `t`, the chrome URLs, and the
    /// per-locale `alternates` of the page itself (the language switcher).
    fn page_value(&self, locale: &Locale, href: &str) -> Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "locale".to_owned(),
            Value::String(locale.code().to_owned()),
        );
        m.insert("t".to_owned(), self.messages.catalog(locale)?.to_value());
        m.insert(
            "home_url".to_owned(),
            Value::String(self.scheme.home(locale).to_string()),
        );
        m.insert(
            "blog_url".to_owned(),
            Value::String(self.scheme.blog_index(locale).to_string()),
        );
        m.insert(
            "static_url".to_owned(),
            Value::String(self.scheme.static_root().to_string()),
        );
        m.insert(
            "feed_url".to_owned(),
            Value::String(self.scheme.feed(locale).to_string()),
        );
        m.insert(
            "alternates".to_owned(),
            Value::Array(
                self.locales
                    .iter()
                    .map(|l| {
                        let mut alternate: HashMap<String, Value> =
                            HashMap::new();
                        alternate.insert(
                            "code".to_owned(),
                            Value::String(l.code().to_owned()),
                        );
                        alternate.insert(
                            "url".to_owned(),
                            Value::String(
                                self.scheme.localized(l, href).to_string(),
                            ),
                        );
                        Value::Object(alternate)
                    })
                    .collect(),
            ),
        );
        Ok(Value::Object(m))
    }

    /// The output path for a route href: `{output}/{locale}{href}/index.html`.
    fn page_path(&self, locale: &Locale, href: &str) -> PathBuf {
        let mut path = self.output_directory.join(locale.code());
        for part in href.split('/').filter(|part| !part.is_empty()) {
            path.push(part);
        }
        path.join("index.html")
    }

    /// Takes a single page value, templates it, and writes it to disk.
    fn render(
        &self,
        template: &Template,
        path: &Path,
        value: Value,
    ) -> Result<()> {
        // page paths always have a parent directory under the output root
        std::fs::create_dir_all(path.parent().unwrap())?;
        template.execute(
            &mut std::fs::File::create(path)?,
            &gtmpl::Context::from(value).unwrap(),
        )?;
        Ok(())
    }
}

/// One blog-index item.
fn item_value(post: &Post, locale: &Locale) -> Value {
    post.to_value(&datefmt::format(post.metadata.published_date, locale))
}

fn insert(value: &mut Value, key: &str, item: Value) {
    if let Value::Object(m) = value {
        m.insert(key.to_owned(), item);
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// A listing or resolution error from the content store.
    Store(store::Error),

    /// A missing or unusable message catalog entry.
    Message(messages::Error),

    /// A (locale, slug) pair from the parameter space that failed to
    /// resolve: the slug exists but has no content file for the locale.
    MissingTranslation { locale: String, slug: String },

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Store(err) => err.fmt(f),
            Error::Message(err) => err.fmt(f),
            Error::MissingTranslation { locale, slug } => write!(
                f,
                "Post `{}` has no content file for locale `{}`",
                slug, locale
            ),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Message(err) => Some(err),
            Error::MissingTranslation { .. } => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<store::Error> for Error {
    /// Converts [`store::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: store::Error) -> Error {
        Error::Store(err)
    }
}

impl From<messages::Error> for Error {
    /// Converts [`messages::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: messages::Error) -> Error {
        Error::Message(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}
