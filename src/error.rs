use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Asset '{key}' not found on item {item_id} (available: {available})")]
    AssetNotFound {
        item_id: String,
        key: String,
        available: String,
    },
    #[error("Raster has no usable georeferencing: {0}")]
    MissingGeoreference(&'static str),
    #[error("Unsupported raster sample format")]
    UnsupportedSampleFormat,
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
