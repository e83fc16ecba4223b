//! Geohash base-32 codec and cell-geometry algebra.
//!
//! A geohash names a rectangular cell on the (lng, lat) grid by interleaved
//! binary subdivision: bits alternate between longitude and latitude starting
//! with longitude, a set bit selecting the upper half of the current interval.
//! Every five bits are packed MSB-first into one character of the base-32
//! alphabet `0123456789bcdefghjkmnpqrstuvwxyz`.

use crate::error::{GeocoverError, Result};
use crate::types::{BoundingBox, Direction, Neighbors};

/// The 32-character geohash alphabet. The character at index *i* encodes the
/// five-bit value *i*; `a`, `i`, `l`, and `o` are excluded.
pub const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Maximum geohash length.
pub const MAX_PRECISION: usize = 12;

const ALPHABET_REV: [i8; 128] = build_alphabet_rev();

const fn build_alphabet_rev() -> [i8; 128] {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
}

/// Latitude height of a cell at the given precision, in degrees.
///
/// A geohash of length *n* carries `⌊5n/2⌋` latitude bits, so the cell is
/// `180 / 2^⌊5n/2⌋` degrees tall.
pub fn lat_step(precision: usize) -> f64 {
    180.0 / (1u64 << (5 * precision / 2)) as f64
}

/// Longitude width of a cell at the given precision, in degrees.
///
/// A geohash of length *n* carries `⌈5n/2⌉` longitude bits, so the cell is
/// `360 / 2^⌈5n/2⌉` degrees wide.
pub fn lng_step(precision: usize) -> f64 {
    360.0 / (1u64 << ((5 * precision + 1) / 2)) as f64
}

/// Normalize a longitude into the half-open range [-180, 180).
///
/// Uses a non-negative modulus, so the boundary value +180 maps to -180.
pub(crate) fn normalize_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

fn validate_precision(precision: usize) -> Result<()> {
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(GeocoverError::InvalidPrecision(precision));
    }
    Ok(())
}

fn validate_geohash(geohash: &str) -> Result<()> {
    if geohash.is_empty() {
        return Err(GeocoverError::EmptyGeohash);
    }
    if geohash.len() > MAX_PRECISION {
        return Err(GeocoverError::TooLong(geohash.len()));
    }
    for ch in geohash.chars() {
        char_index(ch)?;
    }
    Ok(())
}

pub(crate) fn char_index(ch: char) -> Result<usize> {
    let idx = if (ch as usize) < 128 {
        ALPHABET_REV[ch as usize]
    } else {
        -1
    };
    if idx < 0 {
        return Err(GeocoverError::InvalidCharacter(ch));
    }
    Ok(idx as usize)
}

/// Core refinement loop. Callers must pass a latitude in [-90, 90], a
/// longitude in [-180, 180), and a precision in [1, 12].
pub(crate) fn encode_base32(lat: f64, lng: f64, precision: usize) -> String {
    let mut lat_lo = -90.0;
    let mut lat_hi = 90.0;
    let mut lng_lo = -180.0;
    let mut lng_hi = 180.0;

    let mut hash = String::with_capacity(precision);
    let mut bits = 0u8;

    for bit_index in 0..precision * 5 {
        // Even interleaved bit index refines longitude, odd latitude.
        let (value, lo, hi) = if bit_index % 2 == 0 {
            (lng, &mut lng_lo, &mut lng_hi)
        } else {
            (lat, &mut lat_lo, &mut lat_hi)
        };

        let mid = (*lo + *hi) / 2.0;
        if value >= mid {
            bits |= 1 << (4 - bit_index % 5);
            *lo = mid;
        } else {
            *hi = mid;
        }

        if bit_index % 5 == 4 {
            hash.push(ALPHABET[bits as usize] as char);
            bits = 0;
        }
    }

    hash
}

/// Encode a coordinate into a geohash of the given length.
///
/// The longitude is first normalized into [-180, 180) with a non-negative
/// modulus, so +180 and -180 encode to the same cell. Latitudes outside
/// [-90, 90] are rejected. The midpoint comparison is `>=`: a coordinate
/// landing exactly on an interval midpoint refines into the upper half.
///
/// # Examples
///
/// ```
/// use geocover::encode;
///
/// assert_eq!(encode(52.5174, 13.409, 6)?, "u33dc0");
/// assert_eq!(encode(0.0, 0.0, 6)?, "s00000");
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn encode(lat: f64, lng: f64, precision: usize) -> Result<String> {
    validate_precision(precision)?;

    let norm_lng = normalize_lng(lng);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..180.0).contains(&norm_lng) {
        return Err(GeocoverError::InvalidCoordinate { lat, lng });
    }

    Ok(encode_base32(lat, norm_lng, precision))
}

/// Decode a geohash into the `(lat, lng)` center of its cell.
///
/// # Examples
///
/// ```
/// use geocover::{decode, encode};
///
/// let (lat, lng) = decode("u33dc0")?;
/// assert_eq!(encode(lat, lng, 6)?, "u33dc0");
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn decode(geohash: &str) -> Result<(f64, f64)> {
    Ok(decode_bbox(geohash)?.center())
}

/// Decode a geohash into its exact bounding box.
///
/// Walks the five bits of each character MSB-first, halving the longitude
/// interval on even interleaved bit positions and the latitude interval on
/// odd ones.
pub fn decode_bbox(geohash: &str) -> Result<BoundingBox> {
    validate_geohash(geohash)?;

    let mut lat_lo = -90.0;
    let mut lat_hi = 90.0;
    let mut lng_lo = -180.0;
    let mut lng_hi = 180.0;

    let mut bit_index = 0usize;
    for ch in geohash.chars() {
        let value = char_index(ch)?;
        for bit in 0..5 {
            let set = (value >> (4 - bit)) & 1 == 1;
            let (lo, hi) = if bit_index % 2 == 0 {
                (&mut lng_lo, &mut lng_hi)
            } else {
                (&mut lat_lo, &mut lat_hi)
            };

            let mid = (*lo + *hi) / 2.0;
            if set {
                *lo = mid;
            } else {
                *hi = mid;
            }
            bit_index += 1;
        }
    }

    Ok(BoundingBox::new(lat_lo, lat_hi, lng_lo, lng_hi))
}

/// The 32 geohashes one level deeper that tile this cell, in alphabet order.
///
/// # Examples
///
/// ```
/// use geocover::children;
///
/// let kids = children("u")?;
/// assert_eq!(kids.len(), 32);
/// assert_eq!(kids[0], "u0");
/// assert_eq!(kids[31], "uz");
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn children(geohash: &str) -> Result<Vec<String>> {
    validate_geohash(geohash)?;
    if geohash.len() >= MAX_PRECISION {
        return Err(GeocoverError::TooLong(geohash.len()));
    }

    Ok(ALPHABET
        .iter()
        .map(|&ch| {
            let mut child = String::with_capacity(geohash.len() + 1);
            child.push_str(geohash);
            child.push(ch as char);
            child
        })
        .collect())
}

/// The geohash one level up, i.e. the prefix of length `n - 1`.
pub fn parent(geohash: &str) -> Result<String> {
    validate_geohash(geohash)?;
    if geohash.len() <= 1 {
        return Err(GeocoverError::NoParent);
    }
    Ok(geohash[..geohash.len() - 1].to_string())
}

/// The adjacent cell at the same precision in the given direction.
///
/// Cardinal neighbors step one cell width from the current center and
/// re-encode. Diagonals are defined by composition (`NE = E(N(g))` and so
/// on), which makes them inherit the pole and antimeridian policies of the
/// cardinal steps. Longitude wraps across the antimeridian; latitude is
/// clamped at the poles, so the top row is its own northern neighbor.
///
/// # Examples
///
/// ```
/// use geocover::{neighbor, Direction};
///
/// assert_eq!(neighbor("u", Direction::West)?, "g");
/// assert_eq!(neighbor("u", Direction::East)?, "v");
/// assert_eq!(neighbor("u", Direction::South)?, "s");
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn neighbor(geohash: &str, direction: Direction) -> Result<String> {
    let (d_lat, d_lng) = match direction {
        Direction::North => (1.0, 0.0),
        Direction::South => (-1.0, 0.0),
        Direction::East => (0.0, 1.0),
        Direction::West => (0.0, -1.0),
        Direction::Northeast => return compose(geohash, Direction::North, Direction::East),
        Direction::Northwest => return compose(geohash, Direction::North, Direction::West),
        Direction::Southeast => return compose(geohash, Direction::South, Direction::East),
        Direction::Southwest => return compose(geohash, Direction::South, Direction::West),
    };

    let bbox = decode_bbox(geohash)?;
    let precision = geohash.len();
    let (lat, lng) = bbox.center();

    // Clamp at the poles, wrap across the antimeridian.
    let stepped_lat = (lat + d_lat * lat_step(precision)).clamp(-90.0, 90.0);
    let stepped_lng = normalize_lng(lng + d_lng * lng_step(precision));

    Ok(encode_base32(stepped_lat, stepped_lng, precision))
}

fn compose(geohash: &str, first: Direction, second: Direction) -> Result<String> {
    let step = neighbor(geohash, first)?;
    neighbor(&step, second)
}

/// All eight neighbors of a cell.
///
/// Diagonals are composed from the cardinal steps, so every entry follows
/// the same pole and antimeridian rules as [`neighbor`].
pub fn neighbors(geohash: &str) -> Result<Neighbors> {
    let n = neighbor(geohash, Direction::North)?;
    let s = neighbor(geohash, Direction::South)?;
    Ok(Neighbors {
        ne: neighbor(&n, Direction::East)?,
        nw: neighbor(&n, Direction::West)?,
        se: neighbor(&s, Direction::East)?,
        sw: neighbor(&s, Direction::West)?,
        e: neighbor(geohash, Direction::East)?,
        w: neighbor(geohash, Direction::West)?,
        n,
        s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_index_is_bit_value() {
        for (i, &ch) in ALPHABET.iter().enumerate() {
            assert_eq!(char_index(ch as char).unwrap(), i);
        }
        assert!(char_index('a').is_err());
        assert!(char_index('i').is_err());
        assert!(char_index('l').is_err());
        assert!(char_index('o').is_err());
        assert!(char_index('A').is_err());
    }

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(encode(52.5174, 13.409, 6).unwrap(), "u33dc0");
        assert_eq!(encode(0.0, 0.0, 6).unwrap(), "s00000");
        assert_eq!(encode(57.64911, 10.40744, 11).unwrap(), "u4pruydqqvj");
    }

    #[test]
    fn test_encode_midpoint_goes_to_upper_half() {
        // (0, 0) sits exactly on both top-level midpoints; >= sends it into
        // the upper halves, which is the "s" cell.
        assert_eq!(encode(0.0, 0.0, 1).unwrap(), "s");
    }

    #[test]
    fn test_encode_longitude_normalization() {
        // +180 maps to -180, so both ends of the antimeridian agree.
        assert_eq!(
            encode(0.0, 180.0, 6).unwrap(),
            encode(0.0, -180.0, 6).unwrap()
        );
        // A full wrap lands on the same cell.
        assert_eq!(
            encode(40.0, 10.0 + 360.0, 8).unwrap(),
            encode(40.0, 10.0, 8).unwrap()
        );
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(matches!(
            encode(91.0, 0.0, 6),
            Err(GeocoverError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(f64::NAN, 0.0, 6),
            Err(GeocoverError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(0.0, f64::NAN, 6),
            Err(GeocoverError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(0.0, 0.0, 0),
            Err(GeocoverError::InvalidPrecision(0))
        ));
        assert!(matches!(
            encode(0.0, 0.0, 13),
            Err(GeocoverError::InvalidPrecision(13))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode(""), Err(GeocoverError::EmptyGeohash)));
        assert!(matches!(
            decode("0123456789012"),
            Err(GeocoverError::TooLong(13))
        ));
        assert!(matches!(
            decode("u3a"),
            Err(GeocoverError::InvalidCharacter('a'))
        ));
    }

    #[test]
    fn test_roundtrip_at_every_precision() {
        // Deterministic sweep over the globe at each precision.
        for precision in 1..=MAX_PRECISION {
            for i in 0..50 {
                let lat = -85.0 + (i as f64) * 3.4;
                let lng = -175.0 + (i as f64) * 7.1;
                let hash = encode(lat, lng, precision).unwrap();
                let (clat, clng) = decode(&hash).unwrap();
                assert_eq!(encode(clat, clng, precision).unwrap(), hash);
            }
        }
    }

    #[test]
    fn test_bbox_center_is_strictly_interior() {
        for hash in ["u", "u33dc0", "s00000", "zzzzz", "0"] {
            let bbox = decode_bbox(hash).unwrap();
            let (lat, lng) = bbox.center();
            assert!(lat > bbox.min_lat && lat < bbox.max_lat);
            assert!(lng > bbox.min_lng && lng < bbox.max_lng);
        }
    }

    #[test]
    fn test_cell_steps_match_bbox_spans() {
        for precision in 1..=MAX_PRECISION {
            let hash = encode(12.34, 56.78, precision).unwrap();
            let bbox = decode_bbox(&hash).unwrap();
            assert_eq!(bbox.lat_span(), lat_step(precision));
            assert_eq!(bbox.lng_span(), lng_step(precision));
        }
    }

    #[test]
    fn test_children_tile_parent() {
        let parent_bbox = decode_bbox("u33").unwrap();
        let kids = children("u33").unwrap();
        assert_eq!(kids.len(), 32);

        let mut area = 0.0;
        for kid in &kids {
            assert_eq!(kid.len(), 4);
            assert!(kid.starts_with("u33"));
            let bbox = decode_bbox(kid).unwrap();
            assert!(bbox.min_lat >= parent_bbox.min_lat);
            assert!(bbox.max_lat <= parent_bbox.max_lat);
            assert!(bbox.min_lng >= parent_bbox.min_lng);
            assert!(bbox.max_lng <= parent_bbox.max_lng);
            area += bbox.lat_span() * bbox.lng_span();
        }

        // 32 distinct children whose areas sum to the parent's area, all
        // inside the parent: a gap-free, overlap-free tiling.
        let unique: std::collections::HashSet<_> = kids.iter().collect();
        assert_eq!(unique.len(), 32);
        let parent_area = parent_bbox.lat_span() * parent_bbox.lng_span();
        assert!((area - parent_area).abs() < 1e-9);
    }

    #[test]
    fn test_children_guardrails() {
        assert!(matches!(children(""), Err(GeocoverError::EmptyGeohash)));
        assert!(matches!(
            children("u4pruydqqvj7"),
            Err(GeocoverError::TooLong(12))
        ));
    }

    #[test]
    fn test_parent_is_prefix() {
        assert_eq!(parent("u33dc0").unwrap(), "u33dc");
        assert_eq!(parent("u3").unwrap(), "u");
        assert!(matches!(parent("u"), Err(GeocoverError::NoParent)));
        assert!(matches!(parent(""), Err(GeocoverError::EmptyGeohash)));
    }

    #[test]
    fn test_parent_children_duality() {
        let kids = children("tdnu2").unwrap();
        for kid in kids {
            assert_eq!(parent(&kid).unwrap(), "tdnu2");
        }
    }

    #[test]
    fn test_neighbors_single_char() {
        let nb = neighbors("u").unwrap();
        assert_eq!(nb.w, "g");
        assert_eq!(nb.e, "v");
        assert_eq!(nb.s, "s");
        // "u" touches the north pole; the clamped step stays in place.
        assert_eq!(nb.n, "u");
    }

    #[test]
    fn test_neighbor_reciprocity_away_from_poles() {
        for i in 0..40 {
            let lat = -78.0 + (i as f64) * 3.9; // stays within |lat| <= 80
            let lng = -170.0 + (i as f64) * 8.3;
            for precision in [1, 3, 6, 9] {
                let hash = encode(lat, lng, precision).unwrap();
                let north = neighbor(&hash, Direction::North).unwrap();
                assert_eq!(neighbor(&north, Direction::South).unwrap(), hash);
                let east = neighbor(&hash, Direction::East).unwrap();
                assert_eq!(neighbor(&east, Direction::West).unwrap(), hash);
            }
        }
    }

    #[test]
    fn test_neighbor_antimeridian_wrap() {
        // "8" covers lat [0, 45], lng [-180, -135]; stepping west wraps to
        // the eastern hemisphere.
        let west = neighbor("8", Direction::West).unwrap();
        assert_eq!(west, "x");
        let (_, lng) = decode(&west).unwrap();
        assert!(lng > 0.0);

        // And stepping back east returns home.
        assert_eq!(neighbor(&west, Direction::East).unwrap(), "8");
    }

    #[test]
    fn test_neighbor_pole_clamp_stays_in_hemisphere() {
        // Cells touching the poles are their own N (or S) neighbors, and a
        // N-then-S round trip never crosses the equator.
        for lng in [-170.0, -60.0, 0.0, 90.0, 179.0] {
            let top = encode(89.9, lng, 4).unwrap();
            assert_eq!(neighbor(&top, Direction::North).unwrap(), top);

            let bottom = encode(-89.9, lng, 4).unwrap();
            assert_eq!(neighbor(&bottom, Direction::South).unwrap(), bottom);

            let near_top = encode(85.0, lng, 4).unwrap();
            let round = neighbor(
                &neighbor(&near_top, Direction::North).unwrap(),
                Direction::South,
            )
            .unwrap();
            let (lat, _) = decode(&round).unwrap();
            assert!(lat > 0.0);
        }
    }

    #[test]
    fn test_diagonals_compose_from_cardinals() {
        let hash = encode(48.85, 2.35, 6).unwrap();
        let n = neighbor(&hash, Direction::North).unwrap();
        let s = neighbor(&hash, Direction::South).unwrap();
        assert_eq!(
            neighbor(&hash, Direction::Northeast).unwrap(),
            neighbor(&n, Direction::East).unwrap()
        );
        assert_eq!(
            neighbor(&hash, Direction::Northwest).unwrap(),
            neighbor(&n, Direction::West).unwrap()
        );
        assert_eq!(
            neighbor(&hash, Direction::Southeast).unwrap(),
            neighbor(&s, Direction::East).unwrap()
        );
        assert_eq!(
            neighbor(&hash, Direction::Southwest).unwrap(),
            neighbor(&s, Direction::West).unwrap()
        );
    }

    #[test]
    fn test_neighbors_are_adjacent_cells() {
        let hash = encode(40.7, -74.0, 7).unwrap();
        let bbox = decode_bbox(&hash).unwrap();
        let nb = neighbors(&hash).unwrap();

        let north_bbox = decode_bbox(&nb.n).unwrap();
        assert_eq!(north_bbox.min_lat, bbox.max_lat);
        assert_eq!(north_bbox.min_lng, bbox.min_lng);

        let east_bbox = decode_bbox(&nb.e).unwrap();
        assert_eq!(east_bbox.min_lng, bbox.max_lng);
        assert_eq!(east_bbox.min_lat, bbox.min_lat);

        // All eight are distinct from the center and from each other.
        let mut cells: Vec<&str> = nb.iter().map(|(_, h)| h).collect();
        cells.push(&hash);
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 9);
    }
}
