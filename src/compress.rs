//! Prefix compression for geohash sets.
//!
//! Collapses any group of 32 sibling cells into their parent, bottom-up, and
//! drops cells already covered by a present ancestor. The compressed set
//! covers exactly the same region as the input (modulo truncation of entries
//! deeper than the configured maximum level).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::codec::{self, MAX_PRECISION};
use crate::error::{GeocoverError, Result};

/// Precision bounds for [`compress_with`].
///
/// `min_level` cells are never merged into coarser parents; entries deeper
/// than `max_level` are truncated to their `max_level` prefix before
/// compression. Entries *shorter* than `min_level` pass through untouched.
///
/// # Examples
///
/// ```
/// use geocover::CompressOptions;
///
/// let options = CompressOptions::default().with_min_level(3).with_max_level(9);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    /// Coarsest level sibling merging may produce (default: 1).
    pub min_level: usize,
    /// Deepest level retained; longer entries are truncated (default: 12).
    pub max_level: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: MAX_PRECISION,
        }
    }
}

impl CompressOptions {
    pub fn with_min_level(mut self, min_level: usize) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Check that both levels are in [1, 12] and ordered.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PRECISION).contains(&self.min_level) {
            return Err(GeocoverError::InvalidPrecision(self.min_level));
        }
        if !(1..=MAX_PRECISION).contains(&self.max_level) || self.max_level < self.min_level {
            return Err(GeocoverError::InvalidPrecision(self.max_level));
        }
        Ok(())
    }
}

/// Compress a set of geohashes with the default level bounds [1, 12].
///
/// # Examples
///
/// ```
/// use geocover::{children, compress};
///
/// // 32 siblings collapse into their parent.
/// let siblings = children("tdnu2")?;
/// assert_eq!(compress(&siblings)?, vec!["tdnu2".to_string()]);
///
/// // A descendant of a present ancestor is redundant.
/// let hashes = ["y0", "y01", "z2"];
/// assert_eq!(compress(&hashes)?, vec!["y0".to_string(), "z2".to_string()]);
/// # Ok::<(), geocover::GeocoverError>(())
/// ```
pub fn compress<S: AsRef<str>>(geohashes: &[S]) -> Result<Vec<String>> {
    compress_with(geohashes, &CompressOptions::default())
}

/// Compress a set of geohashes within explicit level bounds.
///
/// The pipeline is: normalize (drop empty entries, truncate to `max_level`,
/// deduplicate), prune descendants of present ancestors, then merge complete
/// 32-sibling groups bottom-up until `min_level`. The result is sorted
/// lexicographically. Compression is idempotent and preserves the covered
/// region.
pub fn compress_with<S: AsRef<str>>(
    geohashes: &[S],
    options: &CompressOptions,
) -> Result<Vec<String>> {
    options.validate()?;

    let normalized = normalize(geohashes, options.max_level)?;
    let pruned = prune_descendants(normalized);
    let merged = merge_siblings(pruned, options.min_level);

    Ok(merged.into_iter().collect())
}

/// Drop empty strings, truncate anything deeper than `max_level`, dedupe.
/// Characters outside the alphabet are an error, not a silent keep; a string
/// with a bad character names no cell on Earth.
fn normalize<S: AsRef<str>>(geohashes: &[S], max_level: usize) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    for entry in geohashes {
        let hash = entry.as_ref();
        if hash.is_empty() {
            continue;
        }
        for ch in hash.chars() {
            codec::char_index(ch)?;
        }
        let truncated = &hash[..hash.len().min(max_level)];
        if !out.contains(truncated) {
            out.insert(truncated.to_string());
        }
    }
    Ok(out)
}

/// If both an ancestor and one of its descendants are present, the
/// descendant is redundant. Candidates are visited in ascending length so
/// ancestors are accepted first.
fn prune_descendants(hashes: BTreeSet<String>) -> BTreeSet<String> {
    let mut by_length: Vec<String> = hashes.into_iter().collect();
    by_length.sort_by_key(|h| h.len());

    let mut accepted: BTreeSet<String> = BTreeSet::new();
    for hash in by_length {
        let covered = (1..hash.len()).any(|len| accepted.contains(&hash[..len]));
        if !covered {
            accepted.insert(hash);
        }
    }
    accepted
}

/// Bottom-up sibling merge: for each length from the deepest present down to
/// `min_level + 1`, any 32-strong group sharing a parent prefix is replaced
/// by that parent. A freshly created parent is itself a merge candidate on
/// the next, shallower iteration.
fn merge_siblings(mut hashes: BTreeSet<String>, min_level: usize) -> BTreeSet<String> {
    let Some(deepest) = hashes.iter().map(|h| h.len()).max() else {
        return hashes;
    };

    for length in ((min_level + 1)..=deepest).rev() {
        let mut groups: BTreeMap<&str, u32> = BTreeMap::new();
        for hash in hashes.iter().filter(|h| h.len() == length) {
            *groups.entry(&hash[..length - 1]).or_insert(0) += 1;
        }

        // Entries are deduplicated, so a count of 32 means every sibling is
        // present and the parent tiles exactly the same area.
        let complete: Vec<String> = groups
            .into_iter()
            .filter(|&(_, count)| count == 32)
            .map(|(prefix, _)| prefix.to_string())
            .collect();

        for parent in complete {
            for &ch in codec::ALPHABET.iter() {
                let mut child = parent.clone();
                child.push(ch as char);
                hashes.remove(&child);
            }
            hashes.insert(parent);
        }
    }

    hashes
}
