use crate::bbox::BoundingBox;
use crate::error::ExtractError;
use crate::selection::Selection;
use anyhow::Result;
use serde::Serialize;
use stac::{Asset, Item, ItemCollection};

/// Body of a STAC API `POST /search` request.
#[derive(Serialize, Debug, PartialEq)]
pub struct SearchParams {
    pub collections: Vec<String>,
    pub bbox: BoundingBox,
    pub datetime: String,
    pub limit: u32,
}

impl SearchParams {
    pub fn new(selection: &Selection, date: &str) -> Self {
        Self {
            collections: vec![selection.collection.to_owned()],
            bbox: selection.bbox,
            datetime: datetime_range(date),
            limit: selection.search_limit,
        }
    }
}

/// The full 24 hours of `date` (expected `YYYY-MM-DD`) as a STAC interval.
pub fn datetime_range(date: &str) -> String {
    format!("{date}T00:00:00Z/{date}T23:59:59Z")
}

pub async fn search(
    client: &reqwest::Client,
    stac_api: &str,
    params: &SearchParams,
) -> Result<ItemCollection> {
    let url = format!("{}/search", stac_api.trim_end_matches('/'));
    let item_collection: ItemCollection = client
        .post(url)
        .json(params)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(item_collection)
}

#[derive(Debug)]
pub struct AssetInfo {
    pub item_id: String,
    pub key: String,
    pub href: String,
    pub media_type: Option<String>,
}

impl AssetInfo {
    pub fn from_item(item: &Item, key: &str) -> Result<Self, ExtractError> {
        let asset = item
            .assets
            .get(key)
            .ok_or_else(|| ExtractError::AssetNotFound {
                item_id: item.id.to_owned(),
                key: key.to_owned(),
                available: available_keys(item),
            })?;
        Ok(Self {
            item_id: item.id.to_owned(),
            key: key.to_owned(),
            href: asset.href.to_owned(),
            media_type: Self::extract_media_type(asset),
        })
    }

    fn extract_media_type(asset: &Asset) -> Option<String> {
        asset.r#type.to_owned()
    }
}

fn available_keys(item: &Item) -> String {
    let keys = item.assets.keys().map(String::as_str).collect::<Vec<_>>();
    if keys.is_empty() {
        return "none".to_string();
    }
    keys.join(", ")
}
