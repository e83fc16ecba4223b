//! Parallel grid scan over the cells overlapping a polygon's envelope.

use std::collections::BTreeSet;

use dashmap::DashSet;
use geo::{BoundingRect, Contains, Intersects, Polygon};
use rayon::prelude::*;
use tracing::debug;

use super::Criterion;
use crate::codec;
use crate::error::{GeocoverError, Result};
use crate::progress::{CancelToken, ProgressSink, ProgressTracker};

/// Scan every piece's grid, latitude rows in parallel, and collect the cells
/// matching the criterion into one set.
pub(crate) fn scan(
    pieces: &[Polygon<f64>],
    precision: usize,
    criterion: Criterion,
    progress: Option<&dyn ProgressSink>,
    cancel: Option<&CancelToken>,
) -> Result<BTreeSet<String>> {
    let lat_step = codec::lat_step(precision);
    let lng_step = codec::lng_step(precision);

    let grids: Vec<PieceGrid<'_>> = pieces
        .iter()
        .filter_map(|piece| PieceGrid::new(piece, lat_step, lng_step))
        .collect();
    let total_rows: usize = grids.iter().map(PieceGrid::row_count).sum();

    debug!(
        pieces = grids.len(),
        total_rows, precision, "scanning cover grid"
    );

    let tracker = ProgressTracker::new(total_rows, progress);
    let results: DashSet<String> = DashSet::new();

    for grid in &grids {
        if is_cancelled(cancel) {
            return Err(GeocoverError::Cancelled);
        }
        grid.scan_rows(precision, criterion, &results, &tracker, cancel);
    }

    if is_cancelled(cancel) {
        return Err(GeocoverError::Cancelled);
    }

    tracker.finish();
    Ok(results.into_iter().collect())
}

fn is_cancelled(cancel: Option<&CancelToken>) -> bool {
    cancel.is_some_and(CancelToken::is_cancelled)
}

/// Integer cell-index ranges for one polygon piece. Cell `(lat_idx, lng_idx)`
/// covers `[idx * step, (idx + 1) * step)` on each axis.
struct PieceGrid<'a> {
    piece: &'a Polygon<f64>,
    lat_step: f64,
    lng_step: f64,
    lat_lo: i64,
    lat_hi: i64,
    lng_lo: i64,
    lng_hi: i64,
}

impl<'a> PieceGrid<'a> {
    fn new(piece: &'a Polygon<f64>, lat_step: f64, lng_step: f64) -> Option<Self> {
        let envelope = piece.bounding_rect()?;

        // Expand by half a cell so edge-touching cells are not missed, then
        // clamp to the valid coordinate ranges.
        let min_lat = (envelope.min().y - lat_step / 2.0).max(-90.0);
        let max_lat = (envelope.max().y + lat_step / 2.0).min(90.0);
        let min_lng = (envelope.min().x - lng_step / 2.0).max(-180.0);
        let max_lng = (envelope.max().x + lng_step / 2.0).min(180.0);

        Some(Self {
            piece,
            lat_step,
            lng_step,
            lat_lo: (min_lat / lat_step).floor() as i64,
            lat_hi: (max_lat / lat_step).ceil() as i64,
            lng_lo: (min_lng / lng_step).floor() as i64,
            lng_hi: (max_lng / lng_step).ceil() as i64,
        })
    }

    fn row_count(&self) -> usize {
        (self.lat_hi - self.lat_lo).max(0) as usize
    }

    fn scan_rows(
        &self,
        precision: usize,
        criterion: Criterion,
        results: &DashSet<String>,
        tracker: &ProgressTracker<'_>,
        cancel: Option<&CancelToken>,
    ) {
        (self.lat_lo..self.lat_hi).into_par_iter().for_each(|lat_idx| {
            if is_cancelled(cancel) {
                return;
            }

            let cell_min_lat = lat_idx as f64 * self.lat_step;
            let cell_max_lat = cell_min_lat + self.lat_step;

            for lng_idx in self.lng_lo..self.lng_hi {
                let cell_min_lng = lng_idx as f64 * self.lng_step;
                let cell_max_lng = cell_min_lng + self.lng_step;

                let cell = geo::Rect::new(
                    geo::coord! { x: cell_min_lng, y: cell_min_lat },
                    geo::coord! { x: cell_max_lng, y: cell_max_lat },
                )
                .to_polygon();

                let hit = match criterion {
                    Criterion::Contains => self.piece.contains(&cell),
                    Criterion::Intersects => self.piece.intersects(&cell),
                };

                if hit {
                    let center_lat = (cell_min_lat + cell_max_lat) / 2.0;
                    let center_lng = (cell_min_lng + cell_max_lng) / 2.0;
                    results.insert(codec::encode_base32(center_lat, center_lng, precision));
                }
            }

            tracker.row_done();
        });
    }
}
