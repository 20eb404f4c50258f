use crate::bbox::BoundingBox;
use crate::raster::Grid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_POINTS: usize = 50_000;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Fahrenheit
    pub tavg: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<PointRecord>,
    pub total_points: usize,
    pub truncated: bool,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Every in-box cell with data, column by column (x outer, y inner).
fn qualifying_points<'a>(
    grid: &'a Grid,
    bbox: &'a BoundingBox,
    band: usize,
) -> impl Iterator<Item = PointRecord> + 'a {
    let width = grid.width();
    (0..width).flat_map(move |x| {
        if x % 10 == 0 {
            debug!("Processing column {} of {}...", x + 1, width);
        }
        let lon = grid.lon(x);
        (0..grid.height()).filter_map(move |y| {
            let longitude = lon?;
            let latitude = grid.lat(y)?;
            if !bbox.contains(longitude, latitude) {
                return None;
            }
            let tavg = celsius_to_fahrenheit(grid.value(band, x, y)?);
            if !tavg.is_finite() {
                return None;
            }
            Some(PointRecord {
                latitude,
                longitude,
                tavg,
            })
        })
    })
}

/// Collects at most `max_points` records. `truncated` is set only when at
/// least one further qualifying cell exists past the cap.
pub fn extract(grid: &Grid, bbox: &BoundingBox, band: usize, max_points: usize) -> Extraction {
    let mut points = qualifying_points(grid, bbox, band);
    let records = points.by_ref().take(max_points).collect::<Vec<_>>();
    let truncated = points.next().is_some();

    if truncated {
        warn!(
            "Reached limit of {} locations; remaining grid points were dropped",
            max_points
        );
    } else {
        info!("Finished processing all grid points");
    }

    Extraction {
        records,
        total_points: grid.total_points(),
        truncated,
    }
}
