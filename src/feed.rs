//! Support for creating per-locale Atom feeds from a list of posts.

use crate::config::Author;
use crate::locale::Locale;
use crate::post::Post;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person};
use chrono::{FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub author: Option<Author>,

    /// The localized home page; doubles as the feed id.
    pub home_page: Url,
}

/// Creates a feed for one locale from some configuration ([`FeedConfig`])
/// and that locale's posts, and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    locale: &Locale,
    posts: &[Post],
    w: W,
) -> Result<()> {
    feed(config, locale, posts).write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, locale: &Locale, posts: &[Post]) -> Feed {
    use std::collections::BTreeMap;
    Feed {
        entries: feed_entries(config, posts),
        title: config.title.clone().into(),
        id: config.home_page.to_string(),
        updated: FixedOffset::east(0).from_utc_datetime(&Utc::now().naive_utc()),
        authors: author_to_people(config.author.clone()),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        base: None,
        lang: None,
        extensions: BTreeMap::new(),
        namespaces: BTreeMap::new(),
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: Some(locale.code().to_owned()),
            mime_type: None,
            length: None,
        }],
    }
}

fn feed_entries(config: &FeedConfig, posts: &[Post]) -> Vec<Entry> {
    use std::collections::BTreeMap;
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        // published dates are calendar dates; feed timestamps are midnight
        // UTC of that date
        let date = FixedOffset::east(0).from_utc_datetime(&NaiveDateTime::new(
            post.metadata.published_date,
            NaiveTime::from_hms(0, 0, 0),
        ));

        entries.push(Entry {
            id: post.url.to_string(),
            title: post.metadata.title.clone().into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: post.url.to_string(),
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: Some(post.metadata.description.clone().into()),
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: None,
            extensions: BTreeMap::new(),
        })
    }
    entries
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

/// Represents the result of a feed-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}
