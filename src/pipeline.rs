use crate::extraction::{self, Extraction, PointRecord};
use crate::provider::Provider;
use crate::raster::Grid;
use crate::report::RunReport;
use crate::selection::Selection;
use crate::stac_operations::{AssetInfo, SearchParams};
use anyhow::Result;
use std::io::{Cursor, Write};
use tracing::info;

pub struct Outcome {
    pub extraction: Extraction,
    pub report: RunReport,
}

/// Search, sign, load and extract for a single date. An empty search result
/// is not an error and yields an empty extraction.
pub async fn run(provider: &impl Provider, selection: &Selection, date: &str) -> Result<Outcome> {
    let mut report = RunReport {
        date: date.to_string(),
        collection: selection.collection.to_owned(),
        bbox: selection.bbox,
        item_id: None,
        asset: None,
        signed_url_expiry: None,
        total_points: 0,
        emitted: 0,
        max_points: selection.max_points,
        truncated: false,
    };

    info!(
        "Searching for data in collection '{}' for date {} within BBOX {}...",
        selection.collection, date, selection.bbox
    );
    let params = SearchParams::new(selection, date);
    let item_collection = provider.search(&params).await?;

    let Some(item) = item_collection.items.first() else {
        info!("No data found for the specified date within the bounding box");
        return Ok(Outcome {
            extraction: Extraction::default(),
            report,
        });
    };

    let asset = AssetInfo::from_item(item, &selection.asset)?;
    info!("Data item {} found, signing asset '{}'", asset.item_id, asset.key);
    report.item_id = Some(asset.item_id.to_owned());
    report.asset = Some(asset.key.to_owned());

    let signed = provider.sign(&asset.href).await?;
    report.signed_url_expiry = signed.expiry.to_owned();

    let bytes = provider.fetch(&signed.href).await?;
    let grid = Grid::from_geotiff(Cursor::new(bytes))?;
    info!("Dataset loaded ({} x {}, {} band(s))", grid.width(), grid.height(), grid.bands());
    info!(
        "Total grid points to process: {} (collecting at most {})",
        grid.total_points(),
        selection.max_points
    );

    let extraction = extraction::extract(&grid, &selection.bbox, selection.band, selection.max_points);
    report.total_points = extraction.total_points;
    report.emitted = extraction.records.len();
    report.truncated = extraction.truncated;

    Ok(Outcome { extraction, report })
}

/// Writes the records as a single-line JSON array.
pub fn write_records<W: Write>(mut writer: W, records: &[PointRecord]) -> Result<()> {
    serde_json::to_writer(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
