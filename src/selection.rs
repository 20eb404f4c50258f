use crate::bbox::BoundingBox;
use crate::error::ExtractError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml;

/// Where to search, what to extract and how much of it.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Selection {
    pub id: String,
    pub provider: String,
    pub name: String,
    pub stac_api: String,
    pub sign_api: String,
    pub collection: String,
    pub asset: String,
    pub band: usize,
    pub search_limit: u32,
    pub max_points: usize,
    pub bbox: BoundingBox,
}

pub fn nclimgrid_tavg_toml() -> toml::Table {
    toml::toml! {
        id = "planetarycomputer.noaa-nclimgrid-monthly"

        provider = "Microsoft Planetary Computer"

        name = "NClimGrid monthly average temperature"

        stac_api = "https://planetarycomputer.microsoft.com/api/stac/v1"

        sign_api = "https://planetarycomputer.microsoft.com/api/sas/v1/sign"

        collection = "noaa-nclimgrid-monthly"

        // Celsius, single band
        asset = "tavg"

        band = 0

        search_limit = 5

        max_points = 50000

        // West Virginia and surrounding area
        bbox = [-85.0, 35.0, -75.0, 42.0]
    }
}

impl Selection {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let selection: Self = toml::from_str(&content)?;
        selection.validate()?;
        Ok(selection)
    }

    pub fn from_template(table: &toml::Table) -> Result<Self> {
        let selection: Self = toml::from_str(&table.to_string())?;
        selection.validate()?;
        Ok(selection)
    }

    pub fn validate(self: &Self) -> Result<(), ExtractError> {
        if self.max_points == 0 {
            return Err(ExtractError::InvalidSelection(
                "max_points must be greater than zero".to_string(),
            ));
        }
        if self.search_limit == 0 {
            return Err(ExtractError::InvalidSelection(
                "search_limit must be greater than zero".to_string(),
            ));
        }
        if self.asset.is_empty() {
            return Err(ExtractError::InvalidSelection(
                "asset key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::from_template(&nclimgrid_tavg_toml()).expect("Built-in selection template is valid")
    }
}
