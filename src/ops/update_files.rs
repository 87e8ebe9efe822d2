//! Updating build documents on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::document::{BuildDocument, TomlDocument};
use crate::ops::update_rules::{update_document, RuleOutcome};
use crate::ops::UpdateContext;
use crate::util::fs::{read_to_string, write_string_atomic};

/// Options for an update run.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Compute the new documents without writing them.
    pub dry_run: bool,
}

/// The result of updating one document.
#[derive(Debug, Clone)]
pub struct FileUpdate {
    pub path: PathBuf,
    pub original: String,
    pub rendered: String,
    pub rules: Vec<(String, RuleOutcome)>,
}

impl FileUpdate {
    pub fn is_changed(&self) -> bool {
        self.original != self.rendered
    }
}

fn update_file(ctx: &UpdateContext<'_>, path: &Path) -> Result<FileUpdate> {
    let original = read_to_string(path)?;
    let mut doc = TomlDocument::parse(&original, &path.display().to_string())?;
    let rules = update_document(ctx, &mut doc)?;

    Ok(FileUpdate {
        path: path.to_path_buf(),
        rendered: doc.render(),
        original,
        rules,
    })
}

/// Update every document in `paths`.
///
/// All documents are updated in memory first; files are written only once
/// every one of them succeeded. Unchanged files are not rewritten.
pub fn update_files(
    ctx: &UpdateContext<'_>,
    paths: &[PathBuf],
    opts: &UpdateOptions,
) -> Result<Vec<FileUpdate>> {
    let updates = paths
        .iter()
        .map(|path| {
            update_file(ctx, path).with_context(|| format!("failed to update {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    if opts.dry_run {
        tracing::info!("Dry run - no files will be written");
        return Ok(updates);
    }

    for update in &updates {
        if update.is_changed() {
            write_string_atomic(&update.path, &update.rendered)?;
            tracing::info!("Updated {}", update.path.display());
        } else {
            tracing::debug!("{} is up to date", update.path.display());
        }
    }

    Ok(updates)
}
