//! Geohash spatial indexing: base-32 codec, polygon coverage, and prefix
//! compression.
//!
//! ```rust
//! use geo::polygon;
//! use geocover::{compress, cover, encode, Criterion};
//!
//! let hash = encode(48.8566, 2.3522, 6)?;
//! assert_eq!(hash, "u09tvw");
//!
//! let area = polygon![
//!     (x: 2.2, y: 48.8),
//!     (x: 2.3, y: 48.8),
//!     (x: 2.3, y: 48.9),
//!     (x: 2.2, y: 48.9),
//!     (x: 2.2, y: 48.8),
//! ];
//! let cells = cover(&area, 4, Criterion::Intersects)?;
//! assert!(cells.contains("u09t"));
//!
//! let merged = compress(&cells.into_iter().collect::<Vec<_>>())?;
//! assert_eq!(merged.len(), 2);
//! # Ok::<(), geocover::GeocoverError>(())
//! ```

pub mod codec;
pub mod compress;
pub mod cover;
pub mod error;
pub mod progress;
pub mod types;

pub use error::{GeocoverError, Result};

pub use codec::{
    children, decode, decode_bbox, encode, lat_step, lng_step, neighbor, neighbors, parent,
    ALPHABET, MAX_PRECISION,
};

pub use types::{BoundingBox, Direction, Neighbors};

pub use cover::{cover, cover_with, Criterion, CoverOptions};

pub use compress::{compress, compress_with, CompressOptions};

pub use progress::{CancelToken, ProgressSink};

pub use geo::{Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeocoverError, Result};

    pub use crate::{decode, decode_bbox, encode, neighbor, neighbors};

    pub use crate::{BoundingBox, Direction, Neighbors};

    pub use crate::{compress, cover, CompressOptions, CoverOptions, Criterion};

    pub use crate::{CancelToken, ProgressSink};

    pub use geo::{Polygon, Rect};
}
