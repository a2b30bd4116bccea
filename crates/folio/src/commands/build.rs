//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_site::SiteBuilder;

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building site...");

    let mut config = ConfigFile::load(config_path)?.into_site_config();
    if let Some(output) = output {
        config.output_dir = output;
    }

    let result = SiteBuilder::new(config).build()?;

    tracing::info!(
        "Built {} posts, {} pages and {} redirects, copied {} files in {}ms",
        result.posts,
        result.pages,
        result.redirects,
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
