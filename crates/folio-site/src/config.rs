//! Site configuration.
//!
//! A [`SiteConfig`] is assembled once, either through [`SiteConfigBuilder`]
//! or from `folio.toml` by the CLI, and handed to the builder by value.

use std::path::{Path, PathBuf};

use folio_content::{DirectoryData, Permalink};

/// Default permalink for posts.
pub const DEFAULT_POST_PERMALINK: &str = "/writing/{slug}/";

/// Default legacy URL that redirects to each post.
pub const DEFAULT_REDIRECT_FROM: &str = "/{slug}/";

/// Configuration for the posts collection.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Directory holding the posts, relative to the input directory
    pub dir: PathBuf,

    /// Layout used when neither frontmatter nor directory data set one
    pub layout: Option<String>,

    /// Permalink used when neither frontmatter nor directory data set one
    pub permalink: Permalink,

    /// Legacy URL pattern to emit redirect pages for (`None` disables them)
    pub redirect_from: Option<Permalink>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("_posts"),
            layout: Some("base.html".to_string()),
            permalink: Permalink::new(DEFAULT_POST_PERMALINK),
            redirect_from: Some(Permalink::new(DEFAULT_REDIRECT_FROM)),
        }
    }
}

impl CollectionConfig {
    /// Defaults handed to the content loader.
    pub fn directory_defaults(&self) -> DirectoryData {
        DirectoryData {
            layout: self.layout.clone(),
            permalink: Some(self.permalink.clone()),
        }
    }
}

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Source directory
    pub input_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Layouts directory, relative to the input directory
    pub layouts_dir: PathBuf,

    /// Site title
    pub title: String,

    /// Files and directories copied verbatim, relative to the input directory
    pub passthrough: Vec<PathBuf>,

    /// Files and directories never rendered as pages, relative to the input directory
    pub ignore: Vec<PathBuf>,

    /// Posts collection
    pub posts: CollectionConfig,

    /// Script injected before `</body>` in every HTML output (dev server only)
    pub live_reload: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("_site"),
            layouts_dir: PathBuf::from("_layouts"),
            title: "Writing".to_string(),
            passthrough: vec![],
            ignore: vec![PathBuf::from("README.md")],
            posts: CollectionConfig::default(),
            live_reload: None,
        }
    }
}

impl SiteConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::default()
    }

    /// Absolute-or-relative path of the layouts directory.
    pub fn layouts_path(&self) -> PathBuf {
        self.input_dir.join(&self.layouts_dir)
    }

    /// Absolute-or-relative path of the posts directory.
    pub fn posts_path(&self) -> PathBuf {
        self.input_dir.join(&self.posts.dir)
    }

    /// Resolve a path relative to the input directory.
    pub fn input_path(&self, relative: &Path) -> PathBuf {
        self.input_dir.join(relative)
    }
}

/// Builder for [`SiteConfig`].
#[derive(Debug, Clone, Default)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn layouts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.layouts_dir = dir.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Copy a file or directory verbatim into the output root.
    pub fn passthrough_copy(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.passthrough.push(path.into());
        self
    }

    /// Never render `path` as a page.
    pub fn ignore(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ignore.push(path.into());
        self
    }

    pub fn posts(mut self, posts: CollectionConfig) -> Self {
        self.config.posts = posts;
        self
    }

    pub fn live_reload(mut self, script_src: impl Into<String>) -> Self {
        self.config.live_reload = Some(script_src.into());
        self
    }

    pub fn build(self) -> SiteConfig {
        self.config
    }
}
