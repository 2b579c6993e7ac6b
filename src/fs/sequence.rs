//! Sequential part names for append-only multi-part files.
//!
//! A part name is a fixed-width counter over the lowercase letters `a`-`z`.
//! Lexicographic order of part names matches the order they were issued in.

use crate::error::{DataError, Result};

/// Width of every part name.
pub const PART_WIDTH: usize = 3;

/// Name of the first part of a logical file.
pub const FIRST_PART: &str = "aaa";

/// Check whether `name` is a well-formed part name.
pub fn is_part_name(name: &str) -> bool {
    name.len() == PART_WIDTH && name.bytes().all(|b| b.is_ascii_lowercase())
}

/// Compute the part name following `name`.
///
/// Trailing `z`s roll over to `a` and carry into the next position to the
/// left. `"zzz"` has no successor.
///
/// # Example
/// ```
/// use gmdata::fs::sequence::increment;
///
/// assert_eq!(increment("aaz").unwrap(), "aba");
/// assert!(increment("zzz").is_err());
/// ```
pub fn increment(name: &str) -> Result<String> {
    if !is_part_name(name) {
        return Err(DataError::InvalidPartName(name.to_string()));
    }

    let mut bytes = name.as_bytes().to_vec();
    for i in (0..bytes.len()).rev() {
        if bytes[i] == b'z' {
            bytes[i] = b'a';
        } else {
            bytes[i] += 1;
            return String::from_utf8(bytes)
                .map_err(|_| DataError::InvalidPartName(name.to_string()));
        }
    }

    Err(DataError::SequenceExhausted(name.to_string()))
}
