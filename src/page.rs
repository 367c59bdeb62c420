//! Single-post page resolution. [`resolve_post_page`] is the one aggregated
//! step between a requested (locale, slug) pair and renderable page data:
//! locale validation, parameter-space gating, and store resolution all
//! happen behind it, and every failure collapses into the uniform
//! [`NotFound`]. Callers can render the page or render the not-found state;
//! there is no third outcome and no partial data.

use crate::datefmt;
use crate::locale::{Locale, Locales};
use crate::params::StaticParams;
use crate::post::Post;
use crate::store::Store;
use crate::urls::UrlScheme;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// The uniform not-found outcome. Deliberately carries nothing: whether the
/// locale was unsupported, the slug unknown, or the translation missing is
/// indistinguishable to the caller, so no detail can leak into a rendered
/// page.
#[derive(Debug, PartialEq)]
pub struct NotFound;

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "not found")
    }
}

impl std::error::Error for NotFound {}

/// Everything the post template needs: the resolved post, its
/// locale-formatted date display, and the head/Open-Graph material.
pub struct PostPage<'a> {
    pub locale: &'a Locale,
    pub post: Post,
    pub date_display: String,
    pub canonical: Url,
    pub hero_image: Option<Url>,

    /// (locale code, URL) for every supported locale's rendition of this
    /// post.
    pub alternates: Vec<(String, Url)>,
}

/// Resolves the page data for a requested (locale, slug) pair, or
/// [`NotFound`].
pub fn resolve_post_page<'a>(
    store: &Store,
    locales: &'a Locales,
    params: &StaticParams,
    scheme: &UrlScheme,
    locale_code: &str,
    slug: &str,
) -> Result<PostPage<'a>, NotFound> {
    // an unsupported locale is not-found, never a fallback to the default
    let locale = locales.get(locale_code).ok_or(NotFound)?;

    // the parameter space is closed; pairs outside it are rejected before
    // any resolution is attempted
    if !params.contains(locale_code, slug) {
        return Err(NotFound);
    }

    let post = store.resolve(slug, locale).map_err(|_| NotFound)?;
    let date_display = datefmt::format(post.metadata.published_date, locale);
    let hero_image = post
        .metadata
        .hero_image
        .as_ref()
        .map(|relative_path| scheme.asset(slug, relative_path));
    let alternates = locales
        .iter()
        .map(|l| (l.code().to_owned(), scheme.post(l, slug)))
        .collect();

    Ok(PostPage {
        canonical: scheme.post(locale, slug),
        locale,
        post,
        date_display,
        hero_image,
        alternates,
    })
}

impl PostPage<'_> {
    /// Converts the page data into a template value with fields `post`,
    /// `canonical`, `hero_image`, and `alternates`.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("post".to_owned(), self.post.to_value(&self.date_display));
        m.insert(
            "canonical".to_owned(),
            Value::String(self.canonical.to_string()),
        );
        m.insert(
            "hero_image".to_owned(),
            match &self.hero_image {
                Some(url) => Value::String(url.to_string()),
                None => Value::Nil,
            },
        );
        m.insert(
            "alternates".to_owned(),
            Value::Array(
                self.alternates
                    .iter()
                    .map(|(code, url)| {
                        let mut alternate: HashMap<String, Value> =
                            HashMap::new();
                        alternate.insert(
                            "code".to_owned(),
                            Value::String(code.clone()),
                        );
                        alternate.insert(
                            "url".to_owned(),
                            Value::String(url.to_string()),
                        );
                        Value::Object(alternate)
                    })
                    .collect(),
            ),
        );
        Value::Object(m)
    }
}
