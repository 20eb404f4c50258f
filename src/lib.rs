#![allow(async_fn_in_trait)]
pub mod bbox;
mod error;
pub mod extraction;
pub mod pipeline;
pub mod provider;
pub mod raster;
pub mod report;
pub mod selection;
pub mod stac_operations;

pub use error::ExtractError;
