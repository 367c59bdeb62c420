//! The [`UrlScheme`] type: the single owner of URL construction. Every
//! absolute URL on the site derives from the configured `site_root` plus the
//! always-prefix locale policy, so the policy lives in exactly one place.
//!
//! Localized routes are addressed by `href`, the locale-independent route
//! path: `""` for the home page, `"/blog"` for the blog index, and
//! `"/blog/<slug>"` for a single post. The localized URL for an href is
//! `{site_root}/{locale}{href}/`.

use crate::locale::Locale;
use url::Url;

#[derive(Clone, Debug)]
pub struct UrlScheme {
    root: Url,
}

impl UrlScheme {
    /// Constructs the scheme from the configured site root. The root is
    /// normalized to end in a slash so joins treat it as a directory.
    pub fn new(site_root: &Url) -> UrlScheme {
        let mut root = site_root.to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        UrlScheme {
            // re-parsing an absolute URL with a trailing slash appended
            // always succeeds
            root: Url::parse(&root).unwrap(),
        }
    }

    /// The normalized site root.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The localized URL for a route href (`""`, `"/blog"`,
    /// `"/blog/<slug>"`).
    pub fn localized(&self, locale: &Locale, href: &str) -> Url {
        // slugs and locale codes are validated to be URL-safe, so the join
        // always succeeds
        self.root
            .join(&format!("{}{}/", locale.code(), href))
            .unwrap()
    }

    pub fn home(&self, locale: &Locale) -> Url {
        self.localized(locale, "")
    }

    pub fn blog_index(&self, locale: &Locale) -> Url {
        self.localized(locale, "/blog")
    }

    pub fn post(&self, locale: &Locale, slug: &str) -> Url {
        self.localized(locale, &format!("/blog/{}", slug))
    }

    /// The localized Atom feed URL.
    pub fn feed(&self, locale: &Locale) -> Url {
        // see `localized`
        self.root
            .join(&format!("{}/feed.atom", locale.code()))
            .unwrap()
    }

    /// The base URL under which every post's bundled assets live. Post assets
    /// are locale-independent, so this is not prefixed.
    pub fn assets_root(&self) -> Url {
        self.root.join("assets/posts/").unwrap() // see `localized`
    }

    /// The asset directory for one post, with a trailing slash so relative
    /// link targets resolve inside it.
    pub fn asset_base(&self, slug: &str) -> Url {
        self.assets_root().join(&format!("{}/", slug)).unwrap() // see `localized`
    }

    /// The URL for one bundled asset of a post.
    pub fn asset(&self, slug: &str, relative_path: &str) -> Url {
        self.asset_base(slug).join(relative_path).unwrap() // see `localized`
    }

    /// The base URL for theme static files.
    pub fn static_root(&self) -> Url {
        self.root.join("static/").unwrap() // see `localized`
    }
}
