//! Sitemap generation: one entry per static route (home, blog index) plus
//! one per post, each carrying the canonical URL in the default locale, a
//! last-modified date, and every supported locale's alternate URL.

use crate::locale::Locales;
use crate::store::{self, Store};
use crate::urls::UrlScheme;
use chrono::{NaiveDate, Utc};
use std::io::{self, Write};
use url::Url;

/// One sitemap entry.
pub struct Entry {
    /// The canonical URL, always in the default locale.
    pub url: Url,

    /// The post's published date for post entries; the build date for the
    /// static routes.
    pub last_modified: NaiveDate,

    /// (locale code, URL) for every supported locale.
    pub alternates: Vec<(String, Url)>,
}

/// Builds the full entry list. Post entries derive from the default-locale
/// listing, so the only failure mode is a propagated listing failure.
pub fn entries(
    store: &Store,
    locales: &Locales,
    scheme: &UrlScheme,
) -> store::Result<Vec<Entry>> {
    let today = Utc::now().naive_utc().date();
    let mut entries = vec![
        entry(locales, scheme, "", today),
        entry(locales, scheme, "/blog", today),
    ];
    for post in store.posts(locales.default_locale())? {
        entries.push(entry(
            locales,
            scheme,
            &format!("/blog/{}", post.slug),
            post.metadata.published_date,
        ));
    }
    Ok(entries)
}

fn entry(
    locales: &Locales,
    scheme: &UrlScheme,
    href: &str,
    last_modified: NaiveDate,
) -> Entry {
    Entry {
        url: scheme.localized(locales.default_locale(), href),
        last_modified,
        alternates: locales
            .iter()
            .map(|locale| {
                (locale.code().to_owned(), scheme.localized(locale, href))
            })
            .collect(),
    }
}

/// Serializes the entries as `sitemap.xml` with `xhtml:link` alternates.
pub fn write_sitemap<W: Write>(entries: &[Entry], mut w: W) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">"#
    )?;
    for entry in entries {
        writeln!(w, "  <url>")?;
        writeln!(w, "    <loc>{}</loc>", entry.url)?;
        writeln!(
            w,
            "    <lastmod>{}</lastmod>",
            entry.last_modified.format(crate::datefmt::SOURCE_FORMAT)
        )?;
        for (code, url) in &entry.alternates {
            writeln!(
                w,
                r#"    <xhtml:link rel="alternate" hreflang="{}" href="{}"/>"#,
                code, url
            )?;
        }
        writeln!(w, "  </url>")?;
    }
    writeln!(w, "</urlset>")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::locale::test_registry;
    use std::path::Path;

    fn fixture() -> (Locales, Store, UrlScheme) {
        let locales = test_registry();
        let scheme =
            UrlScheme::new(&Url::parse("https://example.org").unwrap());
        let store = Store::load(
            Path::new("./testdata/site/posts"),
            &locales,
            &scheme,
            1,
        )
        .unwrap();
        (locales, store, scheme)
    }

    #[test]
    fn test_one_entry_per_route() -> store::Result<()> {
        let (locales, store, scheme) = fixture();
        let entries = entries(&store, &locales, &scheme)?;
        // home + blog index + one per post
        assert_eq!(2 + store.slugs().len(), entries.len());
        Ok(())
    }

    #[test]
    fn test_canonical_urls_use_the_default_locale() -> store::Result<()> {
        let (locales, store, scheme) = fixture();
        for entry in entries(&store, &locales, &scheme)? {
            assert!(
                entry.url.as_str().starts_with("https://example.org/en-GB/"),
                "got: {}",
                entry.url
            );
        }
        Ok(())
    }

    #[test]
    fn test_every_entry_has_one_alternate_per_locale() -> store::Result<()> {
        let (locales, store, scheme) = fixture();
        for entry in entries(&store, &locales, &scheme)? {
            assert_eq!(locales.len(), entry.alternates.len());
            for locale in locales.iter() {
                assert_eq!(
                    1,
                    entry
                        .alternates
                        .iter()
                        .filter(|(code, _)| code == locale.code())
                        .count()
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_post_entries_carry_the_published_date() -> store::Result<()> {
        let (locales, store, scheme) = fixture();
        let entries = entries(&store, &locales, &scheme)?;
        let hello = entries
            .iter()
            .find(|e| e.url.as_str().ends_with("/blog/hello-world/"))
            .expect("hello-world entry");
        assert_eq!(
            NaiveDate::from_ymd(2023, 11, 27),
            hello.last_modified
        );
        Ok(())
    }

    #[test]
    fn test_serialization() -> store::Result<()> {
        let (locales, store, scheme) = fixture();
        let entries = entries(&store, &locales, &scheme)?;
        let mut out = Vec::new();
        write_sitemap(&entries, &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0""#));
        assert_eq!(4, xml.matches("<url>").count());
        assert!(xml.contains(
            r#"hreflang="pt-BR" href="https://example.org/pt-BR/blog/hello-world/""#
        ));
        assert!(xml.contains("<lastmod>2023-11-27</lastmod>"));
        Ok(())
    }
}
