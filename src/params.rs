//! The static parameter space: the exhaustive, closed set of (locale, slug)
//! pairs the single-post page serves. Computed once, before any page is
//! rendered, as the cross product of the store's slugs and the supported
//! locales. Pairs outside the space are not-found by definition; nothing is
//! ever resolved on demand.

use crate::locale::Locales;
use crate::store::Store;
use std::collections::HashSet;

pub struct StaticParams {
    pairs: HashSet<(String, String)>,
    list: Vec<(String, String)>,
}

impl StaticParams {
    /// Computes the full cross product of `store.slugs()` × supported
    /// locales.
    pub fn new(store: &Store, locales: &Locales) -> StaticParams {
        let mut pairs = HashSet::new();
        let mut list = Vec::with_capacity(store.slugs().len() * locales.len());
        for slug in store.slugs() {
            for locale in locales.iter() {
                let pair = (locale.code().to_owned(), slug.clone());
                pairs.insert(pair.clone());
                list.push(pair);
            }
        }
        StaticParams { pairs, list }
    }

    /// Whether (locale, slug) is a servable pair.
    pub fn contains(&self, locale: &str, slug: &str) -> bool {
        self.pairs
            .contains(&(locale.to_owned(), slug.to_owned()))
    }

    /// The pairs in enumeration order: slugs in store order, each crossed
    /// with the locales in configuration order.
    pub fn iter(&self) -> std::slice::Iter<(String, String)> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
