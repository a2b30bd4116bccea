//! Static site builder.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use folio_content::{
    load_collection, output_path_for, parse_document, render_markdown, ContentError, ContentItem,
    DirectoryData, Frontmatter, Permalink,
};

use crate::collections::{build_redirects_from, posts, slug_collisions, RedirectRecord};
use crate::config::SiteConfig;
use crate::passthrough::copy_passthrough;
use crate::templates::{Collections, Context, PageInfo, PostSummary, SiteContext, TemplateEngine};

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of posts rendered
    pub posts: usize,

    /// Number of standalone pages rendered
    pub pages: usize,

    /// Number of redirect pages written
    pub redirects: usize,

    /// Number of files copied verbatim
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read input: {0}")]
    ReadError(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render {path}: {message}")]
    TemplateError { path: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Invalid permalink {url:?} for {path}")]
    InvalidPermalink { url: String, path: String },
}

/// How a standalone page's body is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    /// Markdown, rendered without template preprocessing
    Markdown,
    /// A minijinja template
    Template,
}

/// A standalone page to be built.
#[derive(Debug)]
struct PageSource {
    /// Source file path
    source_path: PathBuf,

    /// Relative path from the input dir
    relative_path: PathBuf,

    kind: PageKind,

    frontmatter: Frontmatter,

    body: String,

    /// Canonical URL
    url: String,

    /// Output file
    output_path: PathBuf,
}

/// A rendered post or page waiting to be written.
struct Rendered {
    output_path: PathBuf,
    html: String,
}

/// Values shared by every render in one build.
struct RenderScope<'a> {
    templates: &'a TemplateEngine,
    site: &'a SiteContext,
    collections: &'a Collections,
}

/// Static site builder.
pub struct SiteBuilder {
    config: SiteConfig,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Build the site.
    ///
    /// Everything is loaded fresh, so repeated calls pick up every change on disk.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let layouts = self.config.layouts_path();
        let templates = TemplateEngine::new(&layouts).map_err(|e| BuildError::TemplateError {
            path: layouts.display().to_string(),
            message: e.to_string(),
        })?;

        let posts_dir = self.config.posts_path();
        let items = load_collection(
            &posts_dir,
            &self.config.posts.directory_defaults(),
            &self.config.posts.permalink,
        )?;

        for collision in slug_collisions(&items) {
            let sources: Vec<String> = collision
                .sources
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            tracing::warn!(
                "Slug '{}' is shared by {}; the last of them in date order wins",
                collision.slug,
                sources.join(", ")
            );
        }

        let redirects = match &self.config.posts.redirect_from {
            Some(from) => {
                // Collection-wide pattern; per-post overrides are not redirect targets
                let to = DirectoryData::load(&posts_dir)?
                    .permalink
                    .unwrap_or_else(|| self.config.posts.permalink.clone());
                build_redirects_from(&items, from, &to)
            }
            None => Vec::new(),
        };

        let site = SiteContext {
            title: self.config.title.clone(),
        };
        let collections = Collections {
            posts: posts(&items).into_iter().map(PostSummary::from).collect(),
            redirects: redirects.clone(),
        };
        let scope = RenderScope {
            templates: &templates,
            site: &site,
            collections: &collections,
        };

        let pages = self.discover_pages()?;

        // Render posts and pages in parallel
        let mut rendered: Vec<Rendered> = items
            .par_iter()
            .map(|item| self.render_post(item, &scope))
            .collect::<Result<_, _>>()?;

        let rendered_pages: Vec<Rendered> = pages
            .par_iter()
            .map(|page| self.render_page(page, &scope))
            .collect::<Result<_, _>>()?;
        rendered.extend(rendered_pages);

        // Written in order so a shared output path always ends up with the same file
        let mut written = Vec::with_capacity(rendered.len());
        for page in rendered {
            self.write_output(&page.output_path, page.html)?;
            tracing::debug!("Rendered {}", page.output_path.display());
            written.push(page.output_path);
        }

        let redirect_count = self.write_redirects(&redirects, &written, &scope)?;

        let copied = copy_passthrough(
            &self.config.input_dir,
            &self.config.output_dir,
            &self.config.passthrough,
        )?;

        let duration = start.elapsed();

        Ok(BuildResult {
            posts: items.len(),
            pages: pages.len(),
            redirects: redirect_count,
            copied,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Render a single post.
    fn render_post(&self, item: &ContentItem, scope: &RenderScope) -> Result<Rendered, BuildError> {
        let url = item.url();
        let output_path = self.output_path(&url, &item.source_path)?;
        let date = item.date.format("%Y-%m-%d").to_string();

        let context = Context {
            title: Some(item.title().to_string()),
            description: item.frontmatter.description.clone(),
            date: Some(date.clone()),
            content: render_markdown(&item.body),
            page: PageInfo {
                url,
                file_slug: item.file_name.clone(),
                slug: item.slug.clone(),
                date: Some(date),
                input_path: item.source_path.display().to_string(),
            },
            data: item.frontmatter.extra.clone(),
        };

        let html = match &item.layout {
            Some(layout) => scope
                .templates
                .render_layout(layout, &context, scope.site, scope.collections)
                .map_err(|e| template_error(&item.source_path, e))?,
            None => context.content,
        };

        Ok(Rendered { output_path, html })
    }

    /// Render a standalone page.
    fn render_page(&self, page: &PageSource, scope: &RenderScope) -> Result<Rendered, BuildError> {
        let fm = &page.frontmatter;
        let date = fm.date.clone();
        let file_slug = page
            .relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut context = Context {
            title: fm.title.clone(),
            description: fm.description.clone(),
            date: date.clone(),
            content: String::new(),
            page: PageInfo {
                url: page.url.clone(),
                slug: file_slug.clone(),
                file_slug,
                date,
                input_path: page.source_path.display().to_string(),
            },
            data: fm.extra.clone(),
        };

        context.content = match page.kind {
            PageKind::Markdown => render_markdown(&page.body),
            PageKind::Template => scope
                .templates
                .render_page_template(
                    &page.relative_path.to_string_lossy(),
                    &page.body,
                    &context,
                    scope.site,
                    scope.collections,
                )
                .map_err(|e| template_error(&page.source_path, e))?,
        };

        let html = match &fm.layout {
            Some(layout) => scope
                .templates
                .render_layout(layout, &context, scope.site, scope.collections)
                .map_err(|e| template_error(&page.source_path, e))?,
            None => context.content,
        };

        Ok(Rendered {
            output_path: page.output_path.clone(),
            html,
        })
    }

    /// Write a redirect page at each legacy URL that is not already taken.
    fn write_redirects(
        &self,
        redirects: &[RedirectRecord],
        written: &[PathBuf],
        scope: &RenderScope,
    ) -> Result<usize, BuildError> {
        let taken: HashSet<&PathBuf> = written.iter().collect();
        let mut count = 0;

        for redirect in redirects {
            // `//` would land on the site root
            if redirect.slug.is_empty() {
                tracing::warn!(
                    "Skipping redirect {} -> {}: empty slug",
                    redirect.old_url,
                    redirect.new_url
                );
                continue;
            }

            let Some(output_path) = output_path_for(&self.config.output_dir, &redirect.old_url)
            else {
                return Err(BuildError::InvalidPermalink {
                    url: redirect.old_url.clone(),
                    path: redirect.slug.clone(),
                });
            };

            if taken.contains(&output_path) {
                tracing::warn!(
                    "Skipping redirect {} -> {}: a page is already written there",
                    redirect.old_url,
                    redirect.new_url
                );
                continue;
            }

            let html = scope
                .templates
                .render_redirect(redirect, scope.site)
                .map_err(|e| BuildError::TemplateError {
                    path: redirect.old_url.clone(),
                    message: e.to_string(),
                })?;

            self.write_output(&output_path, html)?;
            count += 1;
        }

        Ok(count)
    }

    /// Discover standalone pages in the input directory.
    fn discover_pages(&self) -> Result<Vec<PageSource>, BuildError> {
        let input_dir = &self.config.input_dir;

        if !input_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Input directory not found: {}",
                input_dir.display()
            )));
        }

        let excluded: Vec<PathBuf> = [
            self.config.output_dir.clone(),
            self.config.layouts_path(),
            self.config.posts_path(),
        ]
        .iter()
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect();

        let mut pages = Vec::new();

        for entry in WalkDir::new(input_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e, &excluded))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let kind = match path.extension().and_then(|e| e.to_str()) {
                Some("md") => PageKind::Markdown,
                Some("html") | Some("jinja") | Some("njk") => PageKind::Template,
                _ => continue,
            };

            let source = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let doc = parse_document(&source).map_err(|e| BuildError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            let relative_path = path.strip_prefix(input_dir).unwrap_or(path).to_path_buf();
            let frontmatter = doc.frontmatter.unwrap_or_default();
            let url = page_url(&relative_path, &frontmatter);
            let output_path = self.output_path(&url, path)?;

            pages.push(PageSource {
                source_path: path.to_path_buf(),
                relative_path,
                kind,
                frontmatter,
                body: doc.body,
                url,
                output_path,
            });
        }

        Ok(pages)
    }

    /// Whether a walked entry is outside the set of renderable pages.
    fn is_excluded(&self, entry: &DirEntry, excluded: &[PathBuf]) -> bool {
        if entry.depth() == 0 {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name == "node_modules" {
            return true;
        }

        // _posts, _layouts, _site and other underscore directories are never pages
        if entry.file_type().is_dir() && name.starts_with('_') {
            return true;
        }

        let relative = entry
            .path()
            .strip_prefix(&self.config.input_dir)
            .unwrap_or(entry.path());
        if self.config.passthrough.iter().any(|p| p == relative)
            || self.config.ignore.iter().any(|p| p == relative)
        {
            return true;
        }

        entry.file_type().is_dir()
            && fs::canonicalize(entry.path())
                .map(|p| excluded.contains(&p))
                .unwrap_or(false)
    }

    /// Output file for a URL.
    fn output_path(&self, url: &str, source: &Path) -> Result<PathBuf, BuildError> {
        output_path_for(&self.config.output_dir, url).ok_or_else(|| BuildError::InvalidPermalink {
            url: url.to_string(),
            path: source.display().to_string(),
        })
    }

    /// Write an output file, injecting the live reload script into HTML.
    fn write_output(&self, path: &Path, content: String) -> Result<(), BuildError> {
        let content = match (&self.config.live_reload, is_html(path)) {
            (Some(src), true) => inject_script(&content, src),
            _ => content,
        };

        // Ensure output directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(path, content)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
    }
}

/// URL of a standalone page: its frontmatter permalink, else derived from its path.
///
/// `index.html` maps to its directory, `about.md` to `/about/`.
fn page_url(relative: &Path, frontmatter: &Frontmatter) -> String {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index");

    if let Some(permalink) = &frontmatter.permalink {
        return Permalink::from(permalink.as_str()).render(stem);
    }

    let mut segments: Vec<String> = relative
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    if stem != "index" {
        segments.push(stem.to_string());
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

fn is_html(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("html")
}

/// Insert a script tag before the last `</body>`, or append it.
fn inject_script(html: &str, src: &str) -> String {
    let tag = format!(r#"<script src="{}"></script>"#, src);

    match html.rfind("</body>") {
        Some(pos) => format!("{}{}\n{}", &html[..pos], tag, &html[pos..]),
        None => format!("{}\n{}", html, tag),
    }
}

fn template_error(path: &Path, error: minijinja::Error) -> BuildError {
    BuildError::TemplateError {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
