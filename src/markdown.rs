//! Renders post bodies from markdown to HTML.

use crate::links::Converter;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};
use std::fmt;
use url::ParseError as UrlParseError;

/// Converts markdown to HTML and returns the result.
///
/// * `markdown` is the body of the content file (everything after the
///   frontmatter).
/// * `links` rewrites link and image targets; see [`Converter`].
pub fn to_html(markdown: &str, links: &Converter) -> Result<String, Error> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options)
        .map(|ev| convert(links, ev))
        .collect::<Result<Vec<Event>, UrlParseError>>()?;

    let mut body = String::new();
    html::push_html(&mut body, events.into_iter());
    Ok(body)
}

fn convert<'b>(
    links: &Converter,
    ev: Event<'b>,
) -> Result<Event<'b>, UrlParseError> {
    Ok(match ev {
        Event::Start(tag) => Event::Start(convert_tag(links, tag)?),
        _ => ev,
    })
}

fn convert_tag<'b>(
    links: &Converter,
    tag: Tag<'b>,
) -> Result<Tag<'b>, UrlParseError> {
    Ok(match tag {
        // The post title owns `h1`, so headings in the body are demoted one
        // level: `#` becomes h2 instead of h1.
        Tag::Heading(level) => Tag::Heading(level + 1),

        // Internal links (links from post bodies *to* other posts and
        // bundled assets) need to be converted from their input form to
        // their output form (e.g., a post linking to another post's
        // `en-GB.md` content file needs to link to that post's page).
        Tag::Link(
            kind @ (LinkType::Inline
            | LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Shortcut
            | LinkType::Autolink
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown),
            url,
            title,
        ) => Tag::Link(
            kind,
            CowStr::Boxed(links.convert(&url)?.into_boxed_str()),
            title,
        ),

        // Image targets are bundled assets and get the same treatment.
        Tag::Image(kind, url, title) => Tag::Image(
            kind,
            CowStr::Boxed(links.convert(&url)?.into_boxed_str()),
            title,
        ),

        _ => tag,
    })
}

/// Represents an error converting markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem parsing link targets.
    UrlParse(UrlParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<UrlParseError> for Error {
    /// Converts a [`UrlParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: UrlParseError) -> Error {
        Error::UrlParse(err)
    }
}
