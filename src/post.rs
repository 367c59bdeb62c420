//! Defines the [`Metadata`] and [`Post`] types. A post is identified by a
//! slug that is stable across locales; each supported locale contributes one
//! metadata record and one body for it. See [`Post::to_value`] for how posts
//! are converted into template values.

use chrono::NaiveDate;
use gtmpl_value::Value;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use url::Url;

/// One (slug, locale) metadata record, parsed from the content file's YAML
/// frontmatter. Field names are camelCase in the frontmatter.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// The localized post title.
    pub title: String,

    /// The localized one-paragraph description, shown on the blog index and
    /// used for description/Open-Graph tags.
    pub description: String,

    /// The publication date. Shared across locales by authoring convention,
    /// though nothing enforces it.
    pub published_date: NaiveDate,

    /// The precomputed, localized time-to-read display string (e.g.
    /// `3 min read`).
    pub time_to_read: String,

    /// Optional hero image, as a path relative to the post's bundled assets.
    #[serde(default)]
    pub hero_image: Option<String>,

    /// Post tags, slugified on parse so `macOS` and `MacOS` resolve to the
    /// same tag.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|tag| slug::slugify(tag))
        .collect())
}

/// One post resolved for one locale: its slug, metadata record, rendered
/// HTML body, and canonical page URL in that locale.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub slug: String,
    pub metadata: Metadata,
    pub body: String,
    pub url: Url,
}

impl Post {
    /// Converts the post into a template value. `date_display` is the
    /// locale-formatted rendering of the published date; the caller formats
    /// it because only the caller knows the target locale.
    pub fn to_value(&self, date_display: &str) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), Value::String(self.slug.clone()));
        m.insert(
            "title".to_owned(),
            Value::String(self.metadata.title.clone()),
        );
        m.insert(
            "description".to_owned(),
            Value::String(self.metadata.description.clone()),
        );
        m.insert(
            "published".to_owned(),
            Value::String(
                self.metadata
                    .published_date
                    .format(crate::datefmt::SOURCE_FORMAT)
                    .to_string(),
            ),
        );
        m.insert(
            "date_display".to_owned(),
            Value::String(date_display.to_owned()),
        );
        m.insert(
            "time_to_read".to_owned(),
            Value::String(self.metadata.time_to_read.clone()),
        );
        m.insert(
            "tags".to_owned(),
            Value::Array(
                self.metadata
                    .tags
                    .iter()
                    .map(|tag| Value::String(tag.clone()))
                    .collect(),
            ),
        );
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_metadata_from_frontmatter() {
        let metadata: Metadata = serde_yaml::from_str(
            "title: Hello, world!\n\
             description: The first post.\n\
             publishedDate: 2023-11-27\n\
             timeToRead: 3 min read\n\
             heroImage: hero.svg\n\
             tags: [Meta, Writing]\n",
        )
        .unwrap();

        assert_eq!("Hello, world!", metadata.title);
        assert_eq!(
            NaiveDate::from_ymd(2023, 11, 27),
            metadata.published_date
        );
        assert_eq!("3 min read", metadata.time_to_read);
        assert_eq!(Some("hero.svg".to_owned()), metadata.hero_image);
        assert_eq!(vec!["meta", "writing"], metadata.tags);
    }

    #[test]
    fn test_optional_fields_default() {
        let metadata: Metadata = serde_yaml::from_str(
            "title: Bare\n\
             description: No extras.\n\
             publishedDate: 2024-03-05\n\
             timeToRead: 1 min read\n",
        )
        .unwrap();

        assert_eq!(None, metadata.hero_image);
        assert!(metadata.tags.is_empty());
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let result: std::result::Result<Metadata, _> = serde_yaml::from_str(
            "description: No title.\n\
             publishedDate: 2024-03-05\n\
             timeToRead: 1 min read\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_to_value() {
        let post = Post {
            slug: "hello-world".to_owned(),
            metadata: Metadata {
                title: "Hello, world!".to_owned(),
                description: "The first post.".to_owned(),
                published_date: NaiveDate::from_ymd(2023, 11, 27),
                time_to_read: "3 min read".to_owned(),
                hero_image: None,
                tags: vec!["meta".to_owned()],
            },
            body: "<p>Hi</p>".to_owned(),
            url: Url::parse("https://example.org/en-GB/blog/hello-world/")
                .unwrap(),
        };

        match post.to_value("27 November 2023") {
            Value::Object(m) => {
                assert_eq!(
                    Value::String("hello-world".to_owned()),
                    m["slug"]
                );
                assert_eq!(
                    Value::String("2023-11-27".to_owned()),
                    m["published"]
                );
                assert_eq!(
                    Value::String("27 November 2023".to_owned()),
                    m["date_display"]
                );
                assert_eq!(
                    Value::String(
                        "https://example.org/en-GB/blog/hello-world/"
                            .to_owned()
                    ),
                    m["url"]
                );
            }
            other => panic!("wanted an object, got {:?}", other),
        }
    }
}
