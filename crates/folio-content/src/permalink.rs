//! Permalink patterns and their mapping onto output files.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A URL pattern with a `{slug}` placeholder, such as `/writing/{slug}/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Permalink(String);

impl Permalink {
    /// Placeholder substituted with the item's slug.
    pub const SLUG: &'static str = "{slug}";

    /// Create a permalink from a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Substitute `slug` into the pattern verbatim.
    pub fn render(&self, slug: &str) -> String {
        self.0.replace(Self::SLUG, slug)
    }
}

impl From<&str> for Permalink {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

/// Map a site URL to the file it is written to under `output_dir`.
///
/// `/writing/hello/` maps to `writing/hello/index.html`, `/feed.xml` to
/// `feed.xml`. Returns `None` for URLs that would escape the output directory.
pub fn output_path_for(output_dir: &Path, url: &str) -> Option<PathBuf> {
    let mut path = output_dir.to_path_buf();

    for segment in url.split('/').filter(|s| !s.is_empty()) {
        if segment == ".." || segment == "." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
    }

    if url.is_empty() || url.ends_with('/') {
        path.push("index.html");
    }

    Some(path)
}
