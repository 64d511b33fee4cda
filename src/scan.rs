// Byte-level substring search.
//
// Returns the first offset at which a needle occurs in a haystack. Used to
// locate the dmadata magic, but has no knowledge of the table format.

use subslice::SubsliceExt;

/// Find the lowest offset at which `needle` occurs in `haystack`.
///
/// Empty inputs and needles longer than the haystack never match.
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.is_empty() || needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.find(needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
