use anyhow::{bail, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::{build_globset, Config};
use crate::exclude::{is_regular_file, ExclusionFilter};
use crate::models::{Dialect, SourceDocument};

/// Walk a checkout and collect every documentation file worth converting.
///
/// Artifact directories are pruned through [`ExclusionFilter`], which gives
/// the same verdict as checking each file below them. `.git` is never
/// entered. The result is sorted by relative path.
pub fn discover_documents(root: &Path, config: &Config) -> Result<Vec<SourceDocument>> {
    if !root.is_dir() {
        bail!("Checkout root does not exist: {}", root.display());
    }

    let exclude_set = build_globset(&config.defaults.exclude_globs)?;
    let mut filter = ExclusionFilter::new(root, &config.defaults.exclude_dirs);
    let mut documents = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        entry.file_name() != ".git" && !filter.is_dir_excluded(entry.path())
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !is_regular_file(&entry) {
            continue;
        }

        let path = entry.path();
        let Some(dialect) = Dialect::from_path(path) else {
            continue;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);

        if exclude_set.is_match(relative) {
            continue;
        }

        documents.push(SourceDocument {
            path: path.to_path_buf(),
            relative: relative.to_path_buf(),
            dialect,
        });
    }

    // Sort for deterministic ordering
    documents.sort_by(|a, b| a.relative.cmp(&b.relative));

    tracing::debug!(
        root = %root.display(),
        documents = documents.len(),
        subtrees_scanned = filter.scanned(),
        "discovery finished"
    );

    Ok(documents)
}
