//! `folio.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_site::{CollectionConfig, Permalink, SiteConfig};
use serde::Deserialize;

/// Configuration file structure (folio.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub posts: PostsSection,
    /// Directory relative `input` and `output` paths resolve against
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SiteSection {
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_layouts")]
    pub layouts: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// Files and directories copied verbatim into the output
    #[serde(default)]
    pub passthrough: Vec<String>,
    /// Files and directories never rendered as pages
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostsSection {
    #[serde(default = "default_posts_dir")]
    pub dir: String,
    #[serde(default = "default_layout")]
    pub layout: Option<String>,
    #[serde(default = "default_permalink")]
    pub permalink: String,
    #[serde(default = "default_redirect_from")]
    pub redirect_from: String,
    #[serde(default = "default_redirects")]
    pub redirects: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            layouts: default_layouts(),
            title: default_title(),
            passthrough: Vec::new(),
            ignore: default_ignore(),
        }
    }
}

impl Default for PostsSection {
    fn default() -> Self {
        Self {
            dir: default_posts_dir(),
            layout: default_layout(),
            permalink: default_permalink(),
            redirect_from: default_redirect_from(),
            redirects: default_redirects(),
        }
    }
}

fn default_input() -> String {
    ".".to_string()
}
fn default_output() -> String {
    "_site".to_string()
}
fn default_layouts() -> String {
    "_layouts".to_string()
}
fn default_title() -> String {
    "Writing".to_string()
}
fn default_ignore() -> Vec<String> {
    vec!["README.md".to_string()]
}
fn default_posts_dir() -> String {
    "_posts".to_string()
}
fn default_layout() -> Option<String> {
    Some("base.html".to_string())
}
fn default_permalink() -> String {
    folio_site::config::DEFAULT_POST_PERMALINK.to_string()
}
fn default_redirect_from() -> String {
    folio_site::config::DEFAULT_REDIRECT_FROM.to_string()
}
fn default_redirects() -> bool {
    true
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    ///
    /// Relative site paths are taken from the directory holding `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self {
                root,
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.root = root;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Turn the file into a site configuration.
    pub fn into_site_config(self) -> SiteConfig {
        let posts = CollectionConfig {
            dir: PathBuf::from(self.posts.dir),
            layout: self.posts.layout,
            permalink: Permalink::new(self.posts.permalink),
            redirect_from: self
                .posts
                .redirects
                .then(|| Permalink::new(self.posts.redirect_from)),
        };

        let mut builder = SiteConfig::builder()
            .input_dir(self.root.join(&self.site.input))
            .output_dir(self.root.join(&self.site.output))
            .layouts_dir(self.site.layouts)
            .title(self.site.title)
            .posts(posts);

        for entry in self.site.passthrough {
            builder = builder.passthrough_copy(entry);
        }

        let mut config = builder.build();
        config.ignore = self.site.ignore.into_iter().map(PathBuf::from).collect();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = ConfigFile::load(&temp.path().join("folio.toml"))
            .unwrap()
            .into_site_config();

        assert_eq!(config.output_dir, temp.path().join("_site"));
        assert_eq!(config.posts.dir, PathBuf::from("_posts"));
        assert_eq!(config.posts.permalink.render("a"), "/writing/a/");
        assert_eq!(config.ignore, vec![PathBuf::from("README.md")]);
    }

    #[test]
    fn parses_full_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        fs::write(
            &path,
            r#"
[site]
output = "public"
title = "Notes"
passthrough = ["img", "CNAME"]

[posts]
permalink = "/blog/{slug}/"
redirects = false
"#,
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap().into_site_config();

        assert_eq!(config.output_dir, temp.path().join("public"));
        assert_eq!(config.title, "Notes");
        assert_eq!(
            config.passthrough,
            vec![PathBuf::from("img"), PathBuf::from("CNAME")]
        );
        assert_eq!(config.posts.permalink.render("a"), "/blog/a/");
        assert!(config.posts.redirect_from.is_none());
        assert_eq!(config.posts.layout.as_deref(), Some("base.html"));
    }

    #[test]
    fn paths_resolve_against_the_config_directory() {
        let temp = tempdir().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("folio.toml"), "[site]\ninput = \".\"\noutput = \"public\"\n").unwrap();

        let config = ConfigFile::load(&sub.join("folio.toml"))
            .unwrap()
            .into_site_config();

        assert_eq!(config.input_dir, sub);
        assert_eq!(config.output_dir, sub.join("public"));
    }

    #[test]
    fn bare_file_name_keeps_paths_relative() {
        let config = ConfigFile::load(Path::new("folio.toml.missing"))
            .unwrap()
            .into_site_config();

        assert_eq!(config.input_dir, PathBuf::from("."));
        assert_eq!(config.output_dir, PathBuf::from("_site"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        fs::write(&path, "[site\n").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }
}
