//! Brain atlas helpers: region names and atlas file locations.
//!
//! The region annotation file is `|`-delimited text with a header line, then
//! one row per region starting with its integer id and its name:
//!
//! ```text
//! id|name|acronym|...
//! 997|root|root|...
//! 8|Basic cell groups and regions|grey|...
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::config_dir;

/// Field separator in region annotation files.
pub const DELIMITER: char = '|';

/// Errors reading atlas files.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// I/O error when reading/writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A region row could not be parsed
    #[error("Invalid region row at line {line}: {reason}")]
    InvalidRow {
        /// 1-based line number in the file
        line: usize,
        /// What was wrong with the row
        reason: String,
    },

    /// Preferences file could not be parsed
    #[error("Failed to parse atlas preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Mapping from atlas region id to region name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionIndex {
    regions: BTreeMap<i64, String>,
}

impl RegionIndex {
    /// Parse the contents of a region annotation file.
    ///
    /// The first line is a header and is skipped, as are blank lines.
    pub fn parse(text: &str) -> Result<Self, AtlasError> {
        let mut regions = BTreeMap::new();

        for (idx, row) in text.lines().enumerate().skip(1) {
            if row.trim().is_empty() {
                continue;
            }
            let line = idx + 1;
            let mut fields = row.split(DELIMITER);

            let id_field = fields.next().unwrap_or_default().trim();
            let id: i64 = id_field.parse().map_err(|_| AtlasError::InvalidRow {
                line,
                reason: format!("region id '{id_field}' is not an integer"),
            })?;
            let name = fields.next().ok_or_else(|| AtlasError::InvalidRow {
                line,
                reason: "missing region name".to_string(),
            })?;

            if let Some(previous) = regions.insert(id, unquote(name.trim()).to_string()) {
                log::debug!("Region {id} redefined at line {line} (was '{previous}')");
            }
        }

        Ok(Self { regions })
    }

    /// Name of region `id`.
    pub fn name(&self, id: i64) -> Option<&str> {
        self.regions.get(&id).map(String::as_str)
    }

    /// First region (lowest id) called `name`, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<i64> {
        self.regions
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.regions.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Read a region annotation file.
///
/// A missing file is logged and yields `Ok(None)`; malformed rows are errors.
pub fn read_annotation(path: &Path) -> Result<Option<RegionIndex>, AtlasError> {
    if !path.is_file() {
        log::error!("Failed to find {:?}", path);
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let index = RegionIndex::parse(&text)?;
    log::info!("Read {} atlas regions from {:?}", index.len(), path);
    Ok(Some(index))
}

/// Where the reference atlas lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtlasPrefs {
    /// Absolute path to the directory holding the atlas data
    #[serde(default)]
    pub ara_dir: String,
    /// Image file in `ara_dir` with the atlas volume
    #[serde(default)]
    pub stack_fname: String,
    /// File in `ara_dir` mapping region ids to names
    #[serde(default)]
    pub annotation_fname: String,
}

impl AtlasPrefs {
    /// Path of the region annotation file, None until configured.
    pub fn annotation_path(&self) -> Option<PathBuf> {
        self.join(&self.annotation_fname)
    }

    /// Path of the atlas volume, None until configured.
    pub fn stack_path(&self) -> Option<PathBuf> {
        self.join(&self.stack_fname)
    }

    fn join(&self, fname: &str) -> Option<PathBuf> {
        if self.ara_dir.is_empty() || fname.is_empty() {
            return None;
        }
        Some(Path::new(&self.ara_dir).join(fname))
    }

    /// Location of the atlas preferences file.
    ///
    /// The file does not need to exist; it is created on save.
    pub fn pref_file() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("ara_prefs.json"))
    }

    pub fn load(path: &Path) -> Result<Self, AtlasError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), AtlasError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Saved atlas preferences to {:?}", path);
        Ok(())
    }

    /// Read the region index named by these preferences.
    pub fn read_regions(&self) -> Result<Option<RegionIndex>, AtlasError> {
        match self.annotation_path() {
            Some(path) => read_annotation(&path),
            None => {
                log::warn!("Atlas annotation file is not configured");
                Ok(None)
            }
        }
    }
}
