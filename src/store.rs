//! The content store. The store's on-disk layout is one directory per post
//! slug under `posts/`, containing one `<code>.md` content file per supported
//! locale plus any bundled assets:
//!
//! ```text
//! posts/hello-world/en-GB.md
//! posts/hello-world/pt-BR.md
//! posts/hello-world/hero.svg
//! ```
//!
//! The store is enumerated exactly once, at load time, into a registry
//! mapping (slug, locale) to a fully-resolved entry (metadata plus rendered
//! body); every later lookup is a map access. Content files are parsed
//! concurrently on a worker pool; the first parse failure aborts the load. A
//! *missing* `<code>.md` is not a load error: the entry is absent and
//! [`Store::resolve`] fails for that address instead, since a missing
//! translation is a content-authoring bug that should surface on the lookup
//! path, not a reason to refuse to load the rest of the store.
//!
//! Each content file must be structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter (see [`Metadata`])
//! 3. Terminal frontmatter fence (`---`)
//! 4. Post body (markdown)
//!
//! For example:
//!
//! ```md
//! ---
//! title: Hello, world!
//! description: The first post.
//! publishedDate: 2023-11-27
//! timeToRead: 3 min read
//! ---
//! ## Hello
//!
//! World
//! ```

use crate::links::Converter;
use crate::locale::{Locale, Locales};
use crate::markdown;
use crate::post::{Metadata, Post};
use crate::urls::UrlScheme;
use std::collections::HashMap;
use std::fmt;
use std::fs::{read_dir, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

const MARKDOWN_EXTENSION: &str = ".md";

/// The build-time content registry.
pub struct Store {
    slugs: Vec<String>,
    entries: HashMap<(String, String), Entry>,
    assets: Vec<Asset>,
}

/// One resolved (slug, locale) content unit.
#[derive(Clone)]
struct Entry {
    metadata: Metadata,
    body: String,
    url: Url,
}

/// A non-markdown file bundled with a post: where it is on disk and where it
/// belongs relative to the post's output asset directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    pub source: PathBuf,
    pub slug: String,
    pub relative_path: PathBuf,
}

impl Store {
    /// Enumerates and parses the content store rooted at `posts_directory`.
    /// `threads` is the parse worker count; anything below 2 parses on the
    /// calling thread.
    pub fn load(
        posts_directory: &Path,
        locales: &Locales,
        scheme: &UrlScheme,
        threads: usize,
    ) -> Result<Store> {
        let slugs = list_slug_directories(posts_directory)?;

        let mut jobs: Vec<Job> = Vec::new();
        let mut assets: Vec<Asset> = Vec::new();
        for slug in &slugs {
            let slug_directory = posts_directory.join(slug);
            for locale in locales.iter() {
                let path =
                    slug_directory.join(format!("{}.md", locale.code()));
                if path.is_file() {
                    jobs.push(Job {
                        slug: slug.clone(),
                        locale: locale.clone(),
                        path,
                    });
                }
            }
            collect_assets(&slug_directory, slug, &mut assets)?;
        }

        let entries = if threads < 2 {
            parse_entries(locales, scheme, jobs)?
        } else {
            parse_entries_parallel(locales, scheme, jobs, threads)?
        };

        Ok(Store {
            slugs,
            entries,
            assets,
        })
    }

    /// Every slug in the store exactly once, in the store's canonical order:
    /// lexicographic by slug. Deliberately *not* publication order; the
    /// presentation layer owns its own ordering policy.
    pub fn slugs(&self) -> &[String] {
        &self.slugs
    }

    /// Bundled assets across all posts.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Looks up the content unit addressed by (slug, locale). Fails with
    /// [`Error::MetadataNotFound`] if no content file existed at that
    /// address. Pure read.
    pub fn resolve(&self, slug: &str, locale: &Locale) -> Result<Post> {
        match self
            .entries
            .get(&(slug.to_owned(), locale.code().to_owned()))
        {
            None => Err(Error::MetadataNotFound {
                slug: slug.to_owned(),
            }),
            Some(entry) => Ok(Post {
                slug: slug.to_owned(),
                metadata: entry.metadata.clone(),
                body: entry.body.clone(),
                url: entry.url.clone(),
            }),
        }
    }

    /// Resolves every slug from [`Store::slugs`] against `locale`. The
    /// returned order matches [`Store::slugs`]; the first failure aborts the
    /// whole listing. A missing translation is fatal, not skippable.
    pub fn posts(&self, locale: &Locale) -> Result<Vec<Post>> {
        self.slugs
            .iter()
            .map(|slug| self.resolve(slug, locale))
            .collect()
    }
}

struct Job {
    slug: String,
    locale: Locale,
    path: PathBuf,
}

type Entries = HashMap<(String, String), Entry>;

fn parse_entries(
    locales: &Locales,
    scheme: &UrlScheme,
    jobs: Vec<Job>,
) -> Result<Entries> {
    let mut entries = Entries::with_capacity(jobs.len());
    for job in jobs {
        entries.insert(
            (job.slug.clone(), job.locale.code().to_owned()),
            parse_entry(locales, scheme, &job)?,
        );
    }
    Ok(entries)
}

fn parse_entries_parallel(
    locales: &Locales,
    scheme: &UrlScheme,
    jobs: Vec<Job>,
    threads: usize,
) -> Result<Entries> {
    use crossbeam_channel::unbounded;
    use std::thread;

    let (tx, rx) = unbounded::<Job>();
    let mut workers = Vec::with_capacity(threads);

    for _ in 0..workers.capacity() {
        let rx = rx.clone();
        let locales = locales.clone();
        let scheme = scheme.clone();
        workers.push(thread::spawn(
            move || -> Result<Vec<((String, String), Entry)>> {
                let mut parsed = Vec::new();
                for job in rx {
                    let key =
                        (job.slug.clone(), job.locale.code().to_owned());
                    parsed.push((key, parse_entry(&locales, &scheme, &job)?));
                }
                Ok(parsed)
            },
        ));
    }

    for job in jobs {
        // the receivers only disconnect once `tx` is dropped, so the send
        // always succeeds
        tx.send(job).unwrap();
    }
    drop(tx);

    let mut entries = Entries::new();
    for worker in workers {
        entries.extend(worker.join().unwrap()?);
    }
    Ok(entries)
}

fn parse_entry(
    locales: &Locales,
    scheme: &UrlScheme,
    job: &Job,
) -> Result<Entry> {
    match _parse_entry(locales, scheme, job) {
        Ok(entry) => Ok(entry),
        Err(e) => Err(Error::Annotated(
            format!("parsing content file `{}`", job.path.display()),
            Box::new(e),
        )),
    }
}

fn _parse_entry(
    locales: &Locales,
    scheme: &UrlScheme,
    job: &Job,
) -> Result<Entry> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find("---") {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let mut contents = String::new();
    File::open(&job.path)?.read_to_string(&mut contents)?;
    let input: &str = &contents;

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let metadata: Metadata =
        serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let converter = Converter::new(scheme, locales, &job.slug);
    let body = markdown::to_html(&input[body_start..], &converter)?;

    Ok(Entry {
        metadata,
        body,
        url: scheme.post(&job.locale, &job.slug),
    })
}

/// Enumerates the post directories under `directory` and returns their names
/// in lexicographic order. Non-directories are ignored; a directory whose
/// name isn't already in slug form is an error, since the name becomes part
/// of every URL for the post.
fn list_slug_directories(directory: &Path) -> Result<Vec<String>> {
    let mut slugs = Vec::new();
    for result in read_dir(directory)? {
        let entry = result?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let os_file_name = entry.file_name();
        let name = os_file_name.to_string_lossy();
        if slug::slugify(&name) != name {
            return Err(Error::InvalidSlug(name.into_owned()));
        }
        slugs.push(name.into_owned());
    }
    slugs.sort();
    Ok(slugs)
}

/// Collects the non-markdown files bundled in a slug directory. Markdown
/// files are content (or drafts for locales outside the registry) and are
/// never treated as assets.
fn collect_assets(
    slug_directory: &Path,
    slug: &str,
    assets: &mut Vec<Asset>,
) -> Result<()> {
    use walkdir::WalkDir;
    for result in WalkDir::new(slug_directory) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(MARKDOWN_EXTENSION)
        {
            continue;
        }
        assets.push(Asset {
            source: entry.path().to_owned(),
            slug: slug.to_owned(),
            // strip_prefix can't fail: `slug_directory` is always an
            // ancestor of the entry path
            relative_path: entry
                .path()
                .strip_prefix(slug_directory)
                .unwrap()
                .to_owned(),
        });
    }
    Ok(())
}

/// Represents the result of a content-store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or consulting the content store.
#[derive(Debug)]
pub enum Error {
    /// Returned when a content file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a content file is missing its terminal frontmatter
    /// fence (the starting fence was found but the ending one was missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when there is a problem parsing URLs in a post body.
    UrlParse(url::ParseError),

    /// Returned when a post directory's name isn't in slug form.
    InvalidSlug(String),

    /// Returned when no content unit exists at a requested (slug, locale)
    /// address. Carries the slug for diagnostics.
    MetadataNotFound { slug: String },

    /// Returned for I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation naming the offending file.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Content file must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::InvalidSlug(name) => {
                write!(f, "Post directory `{}` is not a valid slug", name)
            }
            Error::MetadataNotFound { slug } => {
                write!(f, "No metadata found for post `{}`", slug)
            }
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::InvalidSlug(_) => None,
            Error::MetadataNotFound { slug: _ } => None,
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<markdown::Error> for Error {
    fn from(err: markdown::Error) -> Error {
        match err {
            markdown::Error::UrlParse(e) => Error::UrlParse(e),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::locale::test_registry;
    use std::io::Write;

    fn scheme() -> UrlScheme {
        UrlScheme::new(&Url::parse("https://example.org").unwrap())
    }

    fn testdata_store(threads: usize) -> Store {
        let locales = test_registry();
        Store::load(
            Path::new("./testdata/site/posts"),
            &locales,
            &scheme(),
            threads,
        )
        .unwrap()
    }

    #[test]
    fn test_slugs_are_lexicographic() {
        assert_eq!(
            &["hello-world".to_owned(), "second-post".to_owned()],
            testdata_store(1).slugs()
        );
    }

    #[test]
    fn test_resolve_every_pair() -> Result<()> {
        let locales = test_registry();
        let store = testdata_store(1);
        for slug in store.slugs().to_vec() {
            for locale in locales.iter() {
                let post = store.resolve(&slug, locale)?;
                assert_eq!(slug, post.slug);
                assert!(!post.metadata.title.is_empty());
                assert!(!post.body.is_empty());
            }
        }
        Ok(())
    }

    #[test]
    fn test_resolve_localizes_content() -> Result<()> {
        let locales = test_registry();
        let store = testdata_store(1);
        let en = store.resolve("hello-world", locales.get("en-GB").unwrap())?;
        let pt = store.resolve("hello-world", locales.get("pt-BR").unwrap())?;
        assert_eq!(en.metadata.published_date, pt.metadata.published_date);
        assert_ne!(en.metadata.title, pt.metadata.title);
        assert_eq!(
            "https://example.org/pt-BR/blog/hello-world/",
            pt.url.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_missing_slug_fails_for_every_locale() {
        let locales = test_registry();
        let store = testdata_store(1);
        for locale in locales.iter() {
            match store.resolve("missing-post", locale) {
                Err(Error::MetadataNotFound { slug }) => {
                    assert_eq!("missing-post", slug)
                }
                other => panic!(
                    "wanted Error::MetadataNotFound, got {:?}",
                    other.err()
                ),
            }
        }
    }

    #[test]
    fn test_posts_match_slug_order_and_count() -> Result<()> {
        let locales = test_registry();
        let store = testdata_store(1);
        for locale in locales.iter() {
            let posts = store.posts(locale)?;
            assert_eq!(store.slugs().len(), posts.len());
            let slugs: Vec<&str> =
                posts.iter().map(|p| p.slug.as_str()).collect();
            assert_eq!(store.slugs().to_vec(), slugs);
        }
        Ok(())
    }

    #[test]
    fn test_parallel_load_matches_single_threaded() -> Result<()> {
        let locales = test_registry();
        let sequential = testdata_store(1);
        let parallel = testdata_store(4);
        assert_eq!(sequential.slugs(), parallel.slugs());
        for locale in locales.iter() {
            assert_eq!(sequential.posts(locale)?, parallel.posts(locale)?);
        }
        Ok(())
    }

    #[test]
    fn test_assets_are_collected() {
        let store = testdata_store(1);
        let hero = store
            .assets()
            .iter()
            .find(|a| a.slug == "hello-world")
            .expect("hello-world bundles an asset");
        assert_eq!(PathBuf::from("hero.svg"), hero.relative_path);
        // content files are never assets
        assert!(store
            .assets()
            .iter()
            .all(|a| !a.relative_path.to_string_lossy().ends_with(".md")));
    }

    #[test]
    fn test_missing_translation_fails_the_listing() -> Result<()> {
        let locales = test_registry();
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "only-english", &["en-GB"]);
        write_post(dir.path(), "translated", &["en-GB", "pt-BR"]);

        let store = Store::load(dir.path(), &locales, &scheme(), 1)?;
        assert_eq!(2, store.slugs().len());

        // the fully-translated locale lists fine
        assert_eq!(2, store.posts(locales.get("en-GB").unwrap())?.len());

        // one missing translation aborts the whole pt-BR listing
        match store.posts(locales.get("pt-BR").unwrap()) {
            Err(Error::MetadataNotFound { slug }) => {
                assert_eq!("only-english", slug)
            }
            other => panic!(
                "wanted Error::MetadataNotFound, got {:?}",
                other.err()
            ),
        }

        // resolution for the translated post still succeeds
        assert!(store
            .resolve("translated", locales.get("pt-BR").unwrap())
            .is_ok());
        Ok(())
    }

    #[test]
    fn test_invalid_slug_directory_is_rejected() {
        let locales = test_registry();
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "Bad Slug", &["en-GB"]);
        match Store::load(dir.path(), &locales, &scheme(), 1) {
            Err(Error::InvalidSlug(name)) => assert_eq!("Bad Slug", name),
            other => {
                panic!("wanted Error::InvalidSlug, got {:?}", other.err())
            }
        }
    }

    #[test]
    fn test_malformed_frontmatter_aborts_the_load() {
        let locales = test_registry();
        let dir = tempfile::tempdir().unwrap();
        let post_dir = dir.path().join("broken");
        std::fs::create_dir(&post_dir).unwrap();
        let mut file = File::create(post_dir.join("en-GB.md")).unwrap();
        writeln!(file, "no frontmatter here").unwrap();

        match Store::load(dir.path(), &locales, &scheme(), 1) {
            Err(Error::Annotated(_, err)) => match *err {
                Error::FrontmatterMissingStartFence => (),
                other => panic!(
                    "wanted FrontmatterMissingStartFence, got {:?}",
                    other
                ),
            },
            other => {
                panic!("wanted Error::Annotated, got {:?}", other.err())
            }
        }
    }

    fn write_post(posts_dir: &Path, slug: &str, codes: &[&str]) {
        let dir = posts_dir.join(slug);
        std::fs::create_dir(&dir).unwrap();
        for code in codes {
            let mut file =
                File::create(dir.join(format!("{}.md", code))).unwrap();
            writeln!(
                file,
                "---\n\
                 title: {slug} ({code})\n\
                 description: A test post.\n\
                 publishedDate: 2024-01-01\n\
                 timeToRead: 1 min read\n\
                 ---\n\
                 Body of {slug}.",
                slug = slug,
                code = code
            )
            .unwrap();
        }
    }
}
