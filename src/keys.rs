//! Content-derived keys for chunks and tiles.
//!
//! A key is the MD5 digest of a canonical `&`-joined tuple followed by the tuple itself:
//!
//! ```text
//! <hex md5>&<field 0>&<field 1>&...
//! ```
//!
//! The digest spreads keys evenly over the key space of the downstream stores, while the
//! readable suffix keeps keys debuggable. MD5 is used for its fixed width and stability across
//! processes, not for security.

use crate::models::ProjectInfo;

use std::fmt::Display;

/// Separator placed between key fields.
pub const DELIMITER: char = '&';

/// Hash an ordered list of fields into a key.
///
/// # Arguments
///
/// * `fields`: Fields to join, in canonical order
pub fn hash_key(fields: &[&dyn Display]) -> String {
    let mut joined = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            joined.push(DELIMITER);
        }
        joined.push_str(&field.to_string());
    }
    let digest = md5::compute(&joined);
    format!("{:x}{}{}", digest, DELIMITER, joined)
}

/// Returns the key of a chunk.
///
/// # Arguments
///
/// * `num_tiles`: Number of z tiles in the chunk
/// * `project`: Collection, experiment and channel identifiers
/// * `resolution`: Resolution level
/// * `chunk_x`, `chunk_y`, `chunk_z`: Chunk indices
/// * `t`: Time index
pub fn chunk_key(
    num_tiles: u64,
    project: &ProjectInfo,
    resolution: u32,
    chunk_x: u64,
    chunk_y: u64,
    chunk_z: u64,
    t: u64,
) -> String {
    hash_key(&[
        &num_tiles,
        &project[0],
        &project[1],
        &project[2],
        &resolution,
        &chunk_x,
        &chunk_y,
        &chunk_z,
        &t,
    ])
}

/// Returns the key of a tile.
///
/// The tile is identified by its absolute z index rather than its position within a chunk, so
/// the key does not depend on the chunk size.
///
/// # Arguments
///
/// * `project`: Collection, experiment and channel identifiers
/// * `resolution`: Resolution level
/// * `chunk_x`, `chunk_y`: Chunk indices
/// * `z`: Absolute z index of the tile
/// * `t`: Time index
pub fn tile_key(
    project: &ProjectInfo,
    resolution: u32,
    chunk_x: u64,
    chunk_y: u64,
    z: u64,
    t: u64,
) -> String {
    hash_key(&[
        &project[0],
        &project[1],
        &project[2],
        &resolution,
        &chunk_x,
        &chunk_y,
        &z,
        &t,
    ])
}

/// Split a key into its digest and its readable suffix.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(DELIMITER)
}

/// Check that the digest of a key matches its readable suffix.
pub fn verify_key(key: &str) -> bool {
    match split_key(key) {
        Some((digest, joined)) => format!("{:x}", md5::compute(joined)) == digest,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectInfo {
        ["3".to_string(), "3".to_string(), "3".to_string()]
    }

    #[test]
    fn hash_key_format() {
        assert_eq!(
            "b96e7bda9c9feee3259b177bd456b0a5&a&b",
            hash_key(&[&"a", &"b"])
        );
    }

    #[test]
    fn chunk_key_fields() {
        assert_eq!(
            "3163a85d0e633784af34ff15c61b88a0&16&3&3&3&0&0&0&0&0",
            chunk_key(16, &project(), 0, 0, 0, 0, 0)
        );
    }

    #[test]
    fn chunk_key_field_order() {
        let project = ["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(
            "10640e36fab5bdb15e7e33e26d01039c&4&1&2&3&0&2&1&1&0",
            chunk_key(4, &project, 0, 2, 1, 1, 0)
        );
    }

    #[test]
    fn tile_key_fields() {
        assert_eq!(
            "8e72311988539bb1eb0e2b3399577286&3&3&3&0&0&0&0&0",
            tile_key(&project(), 0, 0, 0, 0, 0)
        );
    }

    #[test]
    fn tile_key_uses_absolute_z() {
        let project = ["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(
            "face0d6e7ea7f9df9dcb6783dda4f147&1&2&3&0&2&1&17&0",
            tile_key(&project, 0, 2, 1, 17, 0)
        );
    }

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(
            chunk_key(5, &project(), 1, 2, 3, 4, 5),
            chunk_key(5, &project(), 1, 2, 3, 4, 5)
        );
        assert_eq!(
            tile_key(&project(), 1, 2, 3, 4, 5),
            tile_key(&project(), 1, 2, 3, 4, 5)
        );
    }

    #[test]
    fn chunk_key_depends_on_tile_count() {
        assert_ne!(
            chunk_key(16, &project(), 0, 0, 0, 1, 0),
            chunk_key(4, &project(), 0, 0, 0, 1, 0)
        );
    }

    #[test]
    fn split() {
        let key = tile_key(&project(), 0, 0, 0, 0, 0);
        assert_eq!(
            Some(("8e72311988539bb1eb0e2b3399577286", "3&3&3&0&0&0&0&0")),
            split_key(&key)
        );
        assert_eq!(None, split_key("nodelimiter"));
    }

    #[test]
    fn verify() {
        assert!(verify_key(&chunk_key(16, &project(), 0, 1, 2, 3, 4)));
        assert!(verify_key(&tile_key(&project(), 0, 1, 2, 3, 4)));
        assert!(!verify_key("8e72311988539bb1eb0e2b3399577286&3&3&3&0&0&0&0&1"));
        assert!(!verify_key("nodelimiter"));
    }
}
