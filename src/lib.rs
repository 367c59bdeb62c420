//! The library code for the `wordhord` static site generator, which builds a
//! localized personal portfolio-and-blog site. The architecture can be
//! generally broken down into three distinct steps:
//!
//! 1. Loading the immutable build-time inputs: the project configuration
//!    ([`crate::config`]), the per-locale message catalogs
//!    ([`crate::messages`]), and the content store ([`crate::store`]), which
//!    is enumerated exactly once into a registry mapping (slug, locale) to a
//!    resolved post.
//! 2. Computing the static parameter space ([`crate::params`]): the closed
//!    cross product of every slug and every supported locale. Only pairs in
//!    this space are ever rendered; anything else is uniformly not-found
//!    ([`crate::page`]).
//! 3. Rendering the output files ([`crate::write`]): for each supported
//!    locale a home page, a blog index, one page per post, and a not-found
//!    page, plus the cross-cutting outputs (sitemap with per-locale
//!    alternates, per-locale Atom feeds, root redirect).
//!
//! The locale registry ([`crate::locale`]) is built once from configuration
//! and threaded by reference through everything: route prefixes, date
//! formatting ([`crate::datefmt`]), catalog selection, and link rewriting
//! ([`crate::links`]) all consult the same closed set with its single
//! default.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod datefmt;
pub mod feed;
pub mod links;
pub mod locale;
pub mod markdown;
pub mod messages;
pub mod page;
pub mod params;
pub mod post;
pub mod sitemap;
pub mod store;
pub mod urls;
mod util;
pub mod write;
