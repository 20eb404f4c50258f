use crate::bbox::BoundingBox;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Summary of one run, written next to the JSON output on request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    pub date: String,
    pub collection: String,
    pub bbox: BoundingBox,
    pub item_id: Option<String>,
    pub asset: Option<String>,
    pub signed_url_expiry: Option<String>,
    pub total_points: usize,
    pub emitted: usize,
    pub max_points: usize,
    /// At least one qualifying point past the cap was dropped.
    pub truncated: bool,
}

impl RunReport {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&content)?;
        Ok(report)
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
