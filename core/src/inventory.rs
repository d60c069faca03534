//! # Inventory Seam
//!
//! Target discovery is somebody else's job; this module only fixes
//! the handover shape. A provider yields the run's target list, and
//! the tag-filter helpers parse the two filter-file formats the
//! surrounding tooling produces (newline `key=value` pairs, or a JSON
//! array of objects).

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use fleetdrill_common::fleet::Target;

/// Supplies the targets for one run.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn targets(&self) -> anyhow::Result<Vec<Target>>;
}

/// Reads a JSON array of targets from a file.
pub struct FileInventory {
    path: PathBuf,
}

impl FileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InventoryProvider for FileInventory {
    async fn targets(&self) -> anyhow::Result<Vec<Target>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading target list {}", self.path.display()))?;

        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing target list {}", self.path.display()))
    }
}

/// One tag predicate for inventory filtering.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

/// Parses a tag-filter file.
///
/// Two formats are accepted: a JSON array of `{key, value}` objects,
/// or one `key=value` pair per line. Blank lines and `#` comments are
/// ignored in the line format.
pub fn read_tag_filters(path: &Path) -> anyhow::Result<Vec<TagFilter>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading tag filter file {}", path.display()))?;

    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw)
            .with_context(|| format!("parsing JSON tag filters in {}", path.display()));
    }

    let mut filters = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .with_context(|| format!("{}:{}: expected key=value", path.display(), lineno + 1))?;

        filters.push(TagFilter {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(filters)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
