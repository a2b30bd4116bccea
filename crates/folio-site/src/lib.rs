//! Static site builder for folio blogs.
//!
//! Renders a posts collection, standalone pages and legacy-URL redirects into
//! a static output directory, and copies passthrough files alongside.

pub mod builder;
pub mod collections;
pub mod config;
pub mod filters;
pub mod passthrough;
pub mod templates;

pub use builder::{BuildError, BuildResult, SiteBuilder};
pub use collections::{build_redirects, posts, RedirectRecord};
pub use config::{CollectionConfig, SiteConfig, SiteConfigBuilder};
pub use filters::{format_readable_date, readable_date};
pub use folio_content::{compute_permalink, derive_slug, ContentItem, Permalink};
