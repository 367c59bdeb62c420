//! Rewrites link targets found in post bodies. Authors write links relative
//! to the post's source directory; output pages live elsewhere, so every
//! relative target is resolved to an absolute URL, and targets that address
//! another post's content file are rewritten to that post's page URL.

use crate::locale::Locales;
use crate::urls::UrlScheme;
use url::{ParseError, Url};

const MARKDOWN_EXTENSION: &str = ".md";

/// Converts link targets for one post's body.
pub struct Converter<'a> {
    scheme: &'a UrlScheme,
    locales: &'a Locales,

    /// The post's asset base URL; relative targets resolve against it.
    base: Url,
}

impl<'a> Converter<'a> {
    /// Constructs a converter for the post identified by `slug`.
    pub fn new(
        scheme: &'a UrlScheme,
        locales: &'a Locales,
        slug: &str,
    ) -> Converter<'a> {
        Converter {
            scheme,
            locales,
            base: scheme.asset_base(slug),
        }
    }

    /// Converts a single target:
    ///
    /// * a relative target resolves against the post's asset base, so plain
    ///   asset references (`hero.svg`) become absolute asset URLs;
    /// * a target addressing some post's `<code>.md` content file (e.g.
    ///   `../second-post/en-GB.md`) becomes that post's page URL in the
    ///   locale the file names;
    /// * anything else passes through unchanged.
    pub fn convert(&self, target: &str) -> Result<String> {
        let absolute = match Url::parse(target) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                self.base.join(target)?
            }
            Err(e) => return Err(e),
        };
        Ok(self.convert_absolute(absolute).to_string())
    }

    fn convert_absolute(&self, absolute: Url) -> Url {
        if let Some(relative) =
            self.scheme.assets_root().make_relative(&absolute)
        {
            if !relative.starts_with("../")
                && relative.ends_with(MARKDOWN_EXTENSION)
            {
                // content files sit at `<slug>/<code>.md` under the assets
                // root; anything nested deeper is an ordinary asset
                let trimmed = relative.trim_end_matches(MARKDOWN_EXTENSION);
                let mut parts = trimmed.splitn(2, '/');
                if let (Some(slug), Some(code)) =
                    (parts.next(), parts.next())
                {
                    if !code.contains('/') {
                        if let Some(locale) = self.locales.get(code) {
                            return self.scheme.post(locale, slug);
                        }
                    }
                }
            }
        }
        absolute
    }
}

/// Represents the result of a link conversion.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod test {
    use super::*;
    use crate::locale::test_registry;

    #[test]
    fn test_convert_relative_asset() -> Result<()> {
        fixture(
            "https://example.org/assets/posts/hello-world/hero.svg",
            "hero.svg",
        )
    }

    #[test]
    fn test_convert_relative_asset_leading_dotslash() -> Result<()> {
        fixture(
            "https://example.org/assets/posts/hello-world/hero.svg",
            "./hero.svg",
        )
    }

    #[test]
    fn test_convert_nested_asset() -> Result<()> {
        fixture(
            "https://example.org/assets/posts/hello-world/figures/one.png",
            "figures/one.png",
        )
    }

    #[test]
    fn test_convert_sibling_post() -> Result<()> {
        fixture(
            "https://example.org/en-GB/blog/second-post/",
            "../second-post/en-GB.md",
        )
    }

    #[test]
    fn test_convert_sibling_post_other_locale() -> Result<()> {
        fixture(
            "https://example.org/pt-BR/blog/second-post/",
            "../second-post/pt-BR.md",
        )
    }

    #[test]
    fn test_convert_own_translation() -> Result<()> {
        fixture("https://example.org/en-GB/blog/hello-world/", "en-GB.md")
    }

    #[test]
    fn test_unknown_locale_stays_an_asset() -> Result<()> {
        // `fr-FR` is outside the registry, so the target is treated as a
        // plain bundled file
        fixture(
            "https://example.org/assets/posts/hello-world/fr-FR.md",
            "fr-FR.md",
        )
    }

    #[test]
    fn test_nested_markdown_stays_an_asset() -> Result<()> {
        fixture(
            "https://example.org/assets/posts/hello-world/notes/en-GB.md",
            "notes/en-GB.md",
        )
    }

    #[test]
    fn test_external_url_unchanged() -> Result<()> {
        fixture("https://remote.org/page.md", "https://remote.org/page.md")
    }

    #[test]
    fn test_absolute_content_file() -> Result<()> {
        fixture(
            "https://example.org/en-GB/blog/second-post/",
            "https://example.org/assets/posts/second-post/en-GB.md",
        )
    }

    fn fixture(wanted: &str, target: &str) -> Result<()> {
        let locales = test_registry();
        let scheme = UrlScheme::new(
            &Url::parse("https://example.org").unwrap(),
        );
        assert_eq!(
            wanted,
            Converter::new(&scheme, &locales, "hello-world")
                .convert(target)?,
        );
        Ok(())
    }
}
