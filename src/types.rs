//! Core geometric types shared by the codec, coverer, and compressor.

use geo::{Polygon, Rect};
use serde::{Deserialize, Serialize};

/// A rectangular cell in degree space.
///
/// Latitudes are in [-90, 90] and longitudes in [-180, 180], with
/// `min <= max` on both axes. A geohash of length *n* names exactly one
/// such box, obtained by running the binary refinement *n · 5* times.
///
/// # Examples
///
/// ```
/// use geocover::decode_bbox;
///
/// let bbox = decode_bbox("u")?;
/// assert_eq!(bbox.min_lat, 45.0);
/// assert_eq!(bbox.max_lat, 90.0);
/// assert_eq!(bbox.min_lng, 0.0);
/// assert_eq!(bbox.max_lng, 45.0);
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Create a bounding box from its corner coordinates.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Geometric center as `(lat, lng)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Height of the box in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Width of the box in degrees of longitude.
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Check whether a coordinate lies inside the box (boundary inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Convert into a `geo::Rect` with x = longitude, y = latitude.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! { x: self.min_lng, y: self.min_lat },
            geo::coord! { x: self.max_lng, y: self.max_lat },
        )
    }

    /// Convert into a closed `geo::Polygon` with x = longitude, y = latitude.
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }
}

/// The eight compass directions used for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    /// The four cardinal directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// The eight neighbors of a geohash cell at the same precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub n: String,
    pub ne: String,
    pub e: String,
    pub se: String,
    pub s: String,
    pub sw: String,
    pub w: String,
    pub nw: String,
}

impl Neighbors {
    /// Look up the neighbor in a given direction.
    pub fn get(&self, direction: Direction) -> &str {
        match direction {
            Direction::North => &self.n,
            Direction::Northeast => &self.ne,
            Direction::East => &self.e,
            Direction::Southeast => &self.se,
            Direction::South => &self.s,
            Direction::Southwest => &self.sw,
            Direction::West => &self.w,
            Direction::Northwest => &self.nw,
        }
    }

    /// Iterate over `(direction, geohash)` pairs, clockwise from north.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &str)> {
        Direction::ALL.iter().map(move |&d| (d, self.get(d)))
    }
}
