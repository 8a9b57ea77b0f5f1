//! Per-segment transforms: length bounding and query folding.

use md5::{Digest, Md5};

/// Segments longer than this (in chars) are replaced by their MD5 hex digest.
pub const MAX_SEGMENT_CHARS: usize = 48;

/// Returns the segment unchanged, or its 32-char MD5 hex digest when too long.
///
/// The digest is stable, so repeated encounters of the same long segment map
/// to the same directory or file name.
pub fn shorten_segment(segment: &str) -> String {
    if segment.chars().count() <= MAX_SEGMENT_CHARS {
        segment.to_string()
    } else {
        hex::encode(Md5::digest(segment.as_bytes()))
    }
}

/// Folds a `?query` suffix into the file name, keeping the last extension last.
///
/// `a.css?v_2` becomes `a_v_2.css`; `font?family` becomes `font_family`.
pub fn fold_query(segment: &str) -> String {
    let Some((name, query)) = segment.split_once('?') else {
        return segment.to_string();
    };
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, query, ext),
        None => format!("{}_{}", name, query),
    }
}
