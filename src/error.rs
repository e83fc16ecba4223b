//! Error types for geocover.

use thiserror::Error;

/// Errors produced by the codec, coverer, and compressor.
#[derive(Error, Debug)]
pub enum GeocoverError {
    /// Latitude or longitude outside valid bounds (longitude is checked
    /// after normalization into [-180, 180)).
    #[error("coordinate out of range: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Precision outside [1, 12].
    #[error("precision must be between 1 and 12, got {0}")]
    InvalidPrecision(usize),

    /// Empty string where a geohash was expected.
    #[error("geohash must not be empty")]
    EmptyGeohash,

    /// Geohash longer than 12 characters, or children requested for a
    /// 12-character geohash.
    #[error("geohash too long: {0} characters (max 12)")]
    TooLong(usize),

    /// Character outside the base-32 geohash alphabet.
    #[error("invalid geohash character: {0:?}")]
    InvalidCharacter(char),

    /// Parent requested for a single-character geohash.
    #[error("a single-character geohash has no parent")]
    NoParent,

    /// The geometry engine rejected the polygon as non-simple.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    /// The polygon would need splitting across more than one meridian.
    #[error("polygon spans more than one meridian split; not supported")]
    UnsupportedMultiMeridianSplit,

    /// Cooperative cancellation was observed during a cover operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type for geocover operations.
pub type Result<T> = std::result::Result<T, GeocoverError>;
