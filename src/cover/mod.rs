//! Polygon-to-geohash coverage.
//!
//! Enumerates the geohash cells at a chosen precision that intersect, or are
//! contained in, a polygon. Antimeridian-crossing polygons are split first;
//! each piece is then gridded at the precision's native cell size and
//! classified against the polygon with the `geo` predicates, latitude rows
//! in parallel.

mod antimeridian;
mod grid;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use geo::{Polygon, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::MAX_PRECISION;
use crate::error::{GeocoverError, Result};
use crate::progress::{CancelToken, ProgressSink};

/// How a cell must relate to the polygon to be included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// The cell's bounding box lies fully inside the polygon.
    Contains,
    /// The cell's bounding box shares any area, edge, or point with the
    /// polygon.
    Intersects,
}

/// Optional progress reporting and cancellation for [`cover_with`].
///
/// # Examples
///
/// ```
/// use geocover::{CancelToken, CoverOptions};
///
/// let token = CancelToken::new();
/// let options = CoverOptions::new()
///     .with_progress(|fraction: f64| eprintln!("{:.0}%", fraction * 100.0))
///     .with_cancel(token.clone());
/// ```
#[derive(Clone, Default)]
pub struct CoverOptions {
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: Option<CancelToken>,
}

impl CoverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a progress sink receiving fractions in [0, 1].
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Attach a cancellation token polled between latitude rows.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for CoverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverOptions")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Cover a polygon with geohash cells at the given precision.
///
/// Returns every cell whose bounding box satisfies the criterion against the
/// polygon. The polygon may have holes and may cross the antimeridian (a
/// single crossing; anything needing more than one meridian split is
/// rejected). An empty polygon yields an empty set.
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use geocover::{cover, Criterion};
///
/// let paris = polygon![
///     (x: 2.2, y: 48.8),
///     (x: 2.3, y: 48.8),
///     (x: 2.3, y: 48.9),
///     (x: 2.2, y: 48.9),
///     (x: 2.2, y: 48.8),
/// ];
/// let cells = cover(&paris, 4, Criterion::Intersects)?;
/// assert_eq!(cells.len(), 2);
/// assert!(cells.contains("u09t"));
/// assert!(cells.contains("u09w"));
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn cover(
    polygon: &Polygon<f64>,
    precision: usize,
    criterion: Criterion,
) -> Result<BTreeSet<String>> {
    cover_with(polygon, precision, criterion, &CoverOptions::default())
}

/// [`cover`] with progress reporting and cancellation.
///
/// Progress milestones are integer percents, strictly increasing, reported
/// at most once each; 1.0 arrives exactly once when the scan completes. A
/// cancelled call returns [`GeocoverError::Cancelled`] with no partial
/// result and no final progress report.
pub fn cover_with(
    polygon: &Polygon<f64>,
    precision: usize,
    criterion: Criterion,
    options: &CoverOptions,
) -> Result<BTreeSet<String>> {
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(GeocoverError::InvalidPrecision(precision));
    }

    let progress = options.progress.as_deref();

    if polygon.exterior().0.is_empty() {
        if let Some(sink) = progress {
            sink.report(1.0);
        }
        return Ok(BTreeSet::new());
    }

    if let Err(reason) = polygon.check_validation() {
        return Err(GeocoverError::InvalidPolygon(reason.to_string()));
    }

    let pieces = antimeridian::split(polygon)?;
    debug!(pieces = pieces.len(), precision, ?criterion, "covering polygon");

    grid::scan(&pieces, precision, criterion, progress, options.cancel.as_ref())
}
