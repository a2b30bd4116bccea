//! Content items and collection loading.
//!
//! A collection is every `*.md` file directly inside one directory. Each file
//! becomes a [`ContentItem`] whose slug, date, layout and permalink are
//! resolved once at load time from its file name, its frontmatter and the
//! directory's defaults.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::date::{file_date, parse_date};
use crate::frontmatter::Frontmatter;
use crate::parser::{parse_document, ParseError};
use crate::permalink::Permalink;
use crate::slug::{date_prefix, derive_slug};

/// Defaults shared by every item in a content directory.
///
/// Read from `<dir>/<dirname>.toml`, e.g. `_posts/_posts.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectoryData {
    /// Layout applied to items without a `layout` in their frontmatter
    pub layout: Option<String>,

    /// Permalink applied to items without a `permalink` in their frontmatter
    pub permalink: Option<Permalink>,
}

impl DirectoryData {
    /// Load the directory data file for `dir`, if there is one.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            return Ok(Self::default());
        };

        let path = dir.join(format!("{}.toml", name));
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ContentError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let data = toml::from_str(&content).map_err(|e| ContentError::DirectoryData {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Loaded directory data from {}", path.display());
        Ok(data)
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: DirectoryData) -> DirectoryData {
        DirectoryData {
            layout: self.layout.or(fallback.layout),
            permalink: self.permalink.or(fallback.permalink),
        }
    }
}

/// A single post loaded from disk.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Source file path
    pub source_path: PathBuf,

    /// Base file name without extension
    pub file_name: String,

    /// Slug before date stripping; equal to `file_name`
    pub raw_slug: String,

    /// Slug with any leading date prefix removed
    pub slug: String,

    /// Parsed frontmatter (empty when the file has none)
    pub frontmatter: Frontmatter,

    /// Markdown body without frontmatter
    pub body: String,

    /// Frontmatter date, else file name date, else modification date
    pub date: NaiveDate,

    /// Resolved layout name
    pub layout: Option<String>,

    /// Resolved permalink pattern
    pub permalink: Permalink,
}

impl ContentItem {
    /// Build an item from a file's path and contents.
    ///
    /// Frontmatter wins over `defaults`; `fallback_permalink` applies when
    /// neither sets a permalink.
    pub fn from_source(
        path: &Path,
        source: &str,
        defaults: &DirectoryData,
        fallback_permalink: &Permalink,
    ) -> Result<Self, ContentError> {
        let doc = parse_document(source).map_err(|e| ContentError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        let file_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let slug = derive_slug(&file_name).to_string();
        let frontmatter = doc.frontmatter.unwrap_or_default();

        let date = match frontmatter.date.as_deref() {
            Some(value) => parse_date(value).ok_or_else(|| ContentError::InvalidDate {
                path: path.display().to_string(),
                value: value.to_string(),
            })?,
            None => date_prefix(&file_name)
                .or_else(|| file_date(path))
                .unwrap_or_default(),
        };

        let layout = frontmatter.layout.clone().or_else(|| defaults.layout.clone());
        let permalink = frontmatter
            .permalink
            .as_deref()
            .map(Permalink::from)
            .or_else(|| defaults.permalink.clone())
            .unwrap_or_else(|| fallback_permalink.clone());

        Ok(Self {
            source_path: path.to_path_buf(),
            raw_slug: file_name.clone(),
            file_name,
            slug,
            frontmatter,
            body: doc.body,
            date,
            layout,
            permalink,
        })
    }

    /// Canonical URL of the item.
    pub fn url(&self) -> String {
        self.permalink.render(&self.slug)
    }

    /// Frontmatter title, falling back to the slug.
    pub fn title(&self) -> &str {
        self.frontmatter.title.as_deref().unwrap_or(&self.slug)
    }
}

/// Canonical permalink for an item: its permalink pattern with the slug
/// substituted, `/writing/<slug>/` under the default configuration.
pub fn compute_permalink(item: &ContentItem) -> String {
    item.url()
}

/// Errors that can occur while loading content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Invalid date {value:?} in {path}")]
    InvalidDate { path: String, value: String },

    #[error("Invalid directory data in {path}: {message}")]
    DirectoryData { path: String, message: String },
}

/// Load every `*.md` file directly inside `dir`.
///
/// Directory data found in `dir` takes precedence over `defaults`. Items are
/// returned in natural order: ascending by date, then by source path.
/// A missing directory yields an empty collection.
pub fn load_collection(
    dir: &Path,
    defaults: &DirectoryData,
    fallback_permalink: &Permalink,
) -> Result<Vec<ContentItem>, ContentError> {
    if !dir.is_dir() {
        tracing::warn!("Content directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let defaults = DirectoryData::load(dir)?.or(defaults.clone());
    let mut items = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }

        let source = fs::read_to_string(path).map_err(|e| ContentError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        items.push(ContentItem::from_source(
            path,
            &source,
            &defaults,
            fallback_permalink,
        )?);
    }

    items.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.source_path.cmp(&b.source_path))
    });

    tracing::debug!("Loaded {} items from {}", items.len(), dir.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn writing() -> Permalink {
        Permalink::new("/writing/{slug}/")
    }

    fn item(path: &str, source: &str) -> ContentItem {
        ContentItem::from_source(Path::new(path), source, &DirectoryData::default(), &writing())
            .unwrap()
    }

    #[test]
    fn derives_slug_and_permalink_from_dated_name() {
        let post = item("_posts/2024-01-05-hello-world.md", "# Hi");

        assert_eq!(post.file_name, "2024-01-05-hello-world");
        assert_eq!(post.raw_slug, "2024-01-05-hello-world");
        assert_eq!(post.slug, "hello-world");
        assert_eq!(compute_permalink(&post), "/writing/hello-world/");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn undated_name_keeps_its_slug() {
        let post = item("_posts/about.md", "---\ndate: 2023-06-01\n---\n");

        assert_eq!(post.slug, "about");
        assert_eq!(compute_permalink(&post), "/writing/about/");
    }

    #[test]
    fn frontmatter_date_wins_over_file_name() {
        let post = item("_posts/2024-01-05-late.md", "---\ndate: 2024-02-01\n---\n");

        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(post.slug, "late");
    }

    #[test]
    fn rejects_unparseable_frontmatter_date() {
        let result = ContentItem::from_source(
            Path::new("_posts/x.md"),
            "---\ndate: someday\n---\n",
            &DirectoryData::default(),
            &writing(),
        );

        assert!(matches!(result, Err(ContentError::InvalidDate { .. })));
    }

    #[test]
    fn frontmatter_overrides_directory_defaults() {
        let defaults = DirectoryData {
            layout: Some("base.html".to_string()),
            permalink: Some(Permalink::new("/blog/{slug}/")),
        };

        let inherited = ContentItem::from_source(
            Path::new("_posts/2024-01-05-a.md"),
            "",
            &defaults,
            &writing(),
        )
        .unwrap();
        assert_eq!(inherited.layout.as_deref(), Some("base.html"));
        assert_eq!(inherited.url(), "/blog/a/");

        let overridden = ContentItem::from_source(
            Path::new("_posts/2024-01-05-b.md"),
            "---\nlayout: post.html\npermalink: /{slug}.html\n---\n",
            &defaults,
            &writing(),
        )
        .unwrap();
        assert_eq!(overridden.layout.as_deref(), Some("post.html"));
        assert_eq!(overridden.url(), "/b.html");
    }

    #[test]
    fn title_falls_back_to_slug() {
        assert_eq!(item("_posts/2024-01-05-untitled.md", "").title(), "untitled");
        assert_eq!(
            item("_posts/2024-01-05-x.md", "---\ntitle: Named\n---\n").title(),
            "Named"
        );
    }

    #[test]
    fn loads_collection_in_date_order() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("_posts");
        fs::create_dir_all(posts.join("drafts")).unwrap();

        fs::write(posts.join("2024-03-01-third.md"), "# Third").unwrap();
        fs::write(posts.join("2023-12-25-first.md"), "# First").unwrap();
        fs::write(posts.join("2024-01-05-second.md"), "# Second").unwrap();
        fs::write(posts.join("notes.txt"), "ignored").unwrap();
        fs::write(posts.join("drafts/2025-01-01-nested.md"), "ignored").unwrap();

        let items = load_collection(&posts, &DirectoryData::default(), &writing()).unwrap();
        let slugs: Vec<_> = items.iter().map(|i| i.slug.as_str()).collect();

        assert_eq!(slugs, vec!["first", "second", "third"]);
    }

    #[test]
    fn applies_directory_data_file() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("_posts");
        fs::create_dir_all(&posts).unwrap();

        fs::write(
            posts.join("_posts.toml"),
            "layout = \"post.html\"\npermalink = \"/essays/{slug}/\"\n",
        )
        .unwrap();
        fs::write(posts.join("2024-01-05-hello.md"), "Hi").unwrap();

        let fallback = DirectoryData {
            layout: Some("base.html".to_string()),
            permalink: None,
        };
        let items = load_collection(&posts, &fallback, &writing()).unwrap();

        assert_eq!(items[0].layout.as_deref(), Some("post.html"));
        assert_eq!(items[0].url(), "/essays/hello/");
    }

    #[test]
    fn reports_invalid_directory_data() {
        let temp = tempdir().unwrap();
        let posts = temp.path().join("_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("_posts.toml"), "layout = [").unwrap();

        let result = load_collection(&posts, &DirectoryData::default(), &writing());

        assert!(matches!(result, Err(ContentError::DirectoryData { .. })));
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = tempdir().unwrap();

        let items =
            load_collection(&temp.path().join("nope"), &DirectoryData::default(), &writing())
                .unwrap();

        assert!(items.is_empty());
    }
}
