//! Dataset file handling and the one-time derived-field backfill.
//!
//! A dataset is a JSON object with `authors` and `books` arrays. Records may
//! predate the lowercase projections; [`Dataset::backfill`] recomputes them
//! in one batch without going through author or book writes, and is safe to
//! re-run.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::modules::authors::models::Author;
use crate::modules::books::models::Book;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub books: Vec<Book>,
}

impl Dataset {
    /// Recompute every derived lowercase field in place. Returns how many
    /// author and book records changed; a repeat run returns (0, 0).
    pub fn backfill(&mut self) -> (usize, usize) {
        let authors_changed = self
            .authors
            .iter_mut()
            .map(|author| author.recompute_derived())
            .filter(|&changed| changed)
            .count();
        let books_changed = self
            .books
            .iter_mut()
            .map(|book| book.recompute_derived())
            .filter(|&changed| changed)
            .count();
        (authors_changed, books_changed)
    }
}

pub fn load(path: &Path) -> anyhow::Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse dataset file {}", path.display()))
}

pub fn save(path: &Path, dataset: &Dataset) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(dataset).context("failed to serialize dataset")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write dataset file {}", path.display()))
}

/// Rewrite a dataset file with recomputed derived fields.
pub fn backfill_file(path: &Path) -> anyhow::Result<(usize, usize)> {
    let mut dataset = load(path)?;
    let changed = dataset.backfill();
    save(path, &dataset)?;
    Ok(changed)
}
