//! Passthrough copy of static files.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::builder::BuildError;

/// Copy each entry from `input_dir` into `output_dir` verbatim.
///
/// Directories are copied recursively and keep their relative layout, so
/// `img/a.png` lands at `<output>/img/a.png`. Missing entries are skipped
/// with a warning. Returns the number of files copied.
pub fn copy_passthrough(
    input_dir: &Path,
    output_dir: &Path,
    entries: &[PathBuf],
) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in entries {
        let source = input_dir.join(entry);

        if source.is_file() {
            copy_file(&source, &output_dir.join(entry))?;
            copied += 1;
        } else if source.is_dir() {
            for file in WalkDir::new(&source)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let relative = file.path().strip_prefix(input_dir).unwrap_or(file.path());
                copy_file(file.path(), &output_dir.join(relative))?;
                copied += 1;
            }
        } else {
            tracing::warn!("Passthrough entry not found: {}", source.display());
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }

    fs::copy(from, to).map_err(|e| {
        BuildError::WriteError(format!("{} -> {}: {}", from.display(), to.display(), e))
    })?;

    tracing::debug!("Copied {}", from.display());
    Ok(())
}
