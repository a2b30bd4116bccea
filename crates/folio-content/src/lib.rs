//! Markdown content loading for folio.
//!
//! This crate parses markdown posts with YAML frontmatter, derives slugs from
//! dated file names and resolves each post's permalink from directory defaults.

pub mod date;
pub mod frontmatter;
pub mod item;
pub mod parser;
pub mod permalink;
pub mod slug;

pub use date::{file_date, parse_date};
pub use frontmatter::Frontmatter;
pub use item::{compute_permalink, load_collection, ContentError, ContentItem, DirectoryData};
pub use parser::{parse_document, render_markdown, ParseError, ParsedDoc};
pub use permalink::{output_path_for, Permalink};
pub use slug::{date_prefix, derive_slug};
