//! Antimeridian handling for the coverer.
//!
//! A polygon whose ring hops more than 180 degrees of longitude between
//! consecutive vertices crosses the ±180 meridian. Such a polygon is
//! unwrapped into a continuous ring (subsequent vertices shifted by ±360),
//! clipped against half-plane strips on either side of the crossed meridian,
//! and each piece is translated back into [-180, 180]. Downstream grid
//! scanning then never sees a longitude discontinuity.

use geo::{BooleanOps, BoundingRect, Coord, LineString, Polygon, Translate};
use tracing::debug;

use crate::error::{GeocoverError, Result};

/// Clip strips extend this far from the crossed meridian, comfortably past
/// any longitude the unwrap can produce.
const STRIP_EXTENT: f64 = 1000.0;

/// Split an antimeridian-crossing polygon into one or two pieces that each
/// lie within [-180, 180].
///
/// Polygons already continuous in longitude (including whole-world polygons
/// spanning 360 degrees or more) pass through untouched. Unwrapping that
/// crosses more than one meridian line (`180 + 360k`) is rejected.
pub(crate) fn split(polygon: &Polygon<f64>) -> Result<Vec<Polygon<f64>>> {
    let Some(envelope) = polygon.bounding_rect() else {
        return Ok(Vec::new());
    };
    if envelope.width() >= 360.0 {
        return Ok(vec![polygon.clone()]);
    }

    let crosses = has_jump(polygon.exterior())
        || polygon.interiors().iter().any(has_jump);
    if !crosses {
        return Ok(vec![polygon.clone()]);
    }

    let shell = unwrap_ring(polygon.exterior());
    let (shell_min, shell_max) = lng_range(&shell);
    let shell_mid = (shell_min + shell_max) / 2.0;

    let holes: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|hole| align_to_frame(unwrap_ring(hole), shell_mid))
        .collect();
    let unwrapped = Polygon::new(shell, holes);

    // Meridian lines 180 + 360k strictly inside the unwrapped envelope.
    // The unwrap is anchored at the ring's first vertex, so the envelope can
    // sit in any 360-degree band; one crossed meridian means a two-piece
    // split, more than one is unsupported.
    let crossed: Vec<f64> = (-3..=3)
        .map(|k| 180.0 + 360.0 * f64::from(k))
        .filter(|m| shell_min < *m && *m < shell_max)
        .collect();

    match crossed.as_slice() {
        [] => Ok(vec![polygon.clone()]),
        [meridian] => {
            debug!(meridian, "splitting polygon at antimeridian");
            Ok(clip_at(&unwrapped, *meridian))
        }
        _ => Err(GeocoverError::UnsupportedMultiMeridianSplit),
    }
}

/// Whether any consecutive edge of the ring jumps more than 180 degrees of
/// longitude.
fn has_jump(ring: &LineString<f64>) -> bool {
    ring.0
        .windows(2)
        .any(|pair| (pair[1].x - pair[0].x).abs() > 180.0)
}

/// Make a ring continuous in longitude by shifting each vertex after a
/// >180-degree jump by ±360. The first vertex keeps its raw longitude, so
/// the result may extend beyond [-180, 180].
fn unwrap_ring(ring: &LineString<f64>) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    let mut offset = 0.0;
    let mut prev_x = f64::NAN;

    for coord in &ring.0 {
        if prev_x.is_finite() {
            let delta = coord.x - prev_x;
            if delta > 180.0 {
                offset -= 360.0;
            } else if delta < -180.0 {
                offset += 360.0;
            }
        }
        prev_x = coord.x;
        coords.push(Coord {
            x: coord.x + offset,
            y: coord.y,
        });
    }

    LineString::from(coords)
}

/// Shift an unwrapped hole by a multiple of 360 so it sits in the same
/// longitude frame as the shell.
fn align_to_frame(mut hole: LineString<f64>, shell_mid: f64) -> LineString<f64> {
    if hole.0.is_empty() {
        return hole;
    }
    let (min_x, max_x) = lng_range(&hole);
    let hole_mid = (min_x + max_x) / 2.0;
    let shift = ((shell_mid - hole_mid) / 360.0).round() * 360.0;
    if shift != 0.0 {
        for coord in &mut hole.0 {
            coord.x += shift;
        }
    }
    hole
}

fn lng_range(ring: &LineString<f64>) -> (f64, f64) {
    ring.0.iter().fold((f64::MAX, f64::MIN), |(lo, hi), c| {
        (lo.min(c.x), hi.max(c.x))
    })
}

/// Intersect the unwrapped polygon with the strips on either side of the
/// crossed meridian and translate both sides back into [-180, 180].
fn clip_at(unwrapped: &Polygon<f64>, meridian: f64) -> Vec<Polygon<f64>> {
    // meridian = 180 + 360k; the band west of it maps home by -360k, the
    // band east of it by -360(k + 1).
    let k = ((meridian - 180.0) / 360.0).round();
    let west_shift = -360.0 * k;
    let east_shift = -360.0 * (k + 1.0);

    let west_strip = strip(meridian - STRIP_EXTENT, meridian);
    let east_strip = strip(meridian, meridian + STRIP_EXTENT);

    let mut pieces = Vec::new();
    pieces.extend(
        unwrapped
            .intersection(&west_strip)
            .translate(west_shift, 0.0)
            .0,
    );
    pieces.extend(
        unwrapped
            .intersection(&east_strip)
            .translate(east_shift, 0.0)
            .0,
    );
    pieces
}

fn strip(min_x: f64, max_x: f64) -> Polygon<f64> {
    geo::Rect::new(
        geo::coord! { x: min_x, y: -STRIP_EXTENT },
        geo::coord! { x: max_x, y: STRIP_EXTENT },
    )
    .to_polygon()
}
