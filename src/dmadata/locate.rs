// dmadata discovery.
//
// The table is located by searching for its first record, which is fixed
// for every retail image (the boot segment), plus the start of the record
// after it. Its length is then taken from the record whose start equals the
// table's own offset.

use std::fmt;

use crate::engine::DiffError;
use crate::scan;

use super::entry::{DmaEntry, ENTRY_SIZE, read_u32_be};

// ---------------------------------------------------------------------------
// Flavors
// ---------------------------------------------------------------------------

/// Console family the image was built for. Only the boot segment end differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFlavor {
    /// Retail N64 cartridge image.
    #[default]
    N64,
    /// iQue Player image.
    IQue,
}

impl TableFlavor {
    /// End of the boot segment, which the first two records both mention.
    pub const fn boot_end(self) -> u32 {
        match self {
            Self::N64 => 0x1060,
            Self::IQue => 0x1050,
        }
    }

    /// The 20-byte pattern that marks the start of the table.
    ///
    /// The boot record `[0, boot_end, 0, 0]` followed by the start word of
    /// the next record, which begins where boot ends.
    pub const fn magic(self) -> [u8; 20] {
        let end = self.boot_end().to_be_bytes();
        let mut out = [0u8; 20];
        let mut i = 0;
        while i < 4 {
            out[4 + i] = end[i];
            out[16 + i] = end[i];
            i += 1;
        }
        out
    }
}

impl fmt::Display for TableFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::N64 => f.write_str("n64"),
            Self::IQue => f.write_str("ique"),
        }
    }
}

/// Which of the two compared images an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
    Both,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => f.write_str("old image"),
            Self::New => f.write_str("new image"),
            Self::Both => f.write_str("both images"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved table
// ---------------------------------------------------------------------------

/// Position and size of the dmadata table within an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaTable {
    /// Byte offset of the first record.
    pub offset: usize,
    /// Table length in bytes.
    pub extent: usize,
}

impl DmaTable {
    /// Number of record slots covered by the extent.
    pub fn slots(&self) -> usize {
        self.extent.div_ceil(ENTRY_SIZE)
    }

    /// Decode the record in `slot`, if it lies within `image`.
    pub fn entry(&self, image: &[u8], slot: usize) -> Option<DmaEntry> {
        let at = slot
            .checked_mul(ENTRY_SIZE)
            .and_then(|o| o.checked_add(self.offset))?;
        DmaEntry::read_at(image, at)
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Find the offset of the dmadata table in a single image.
pub fn locate_table(image: &[u8], flavor: TableFlavor) -> Option<usize> {
    scan::find_subslice(image, &flavor.magic())
}

/// Locate the table in both images and require it at the same offset.
pub fn locate_pair(old: &[u8], new: &[u8], flavor: TableFlavor) -> Result<usize, DiffError> {
    match (locate_table(old, flavor), locate_table(new, flavor)) {
        (Some(a), Some(b)) if a == b => {
            log::debug!("dmadata ({flavor}) found at {a:#010x}");
            Ok(a)
        }
        (Some(old), Some(new)) => Err(DiffError::IndexLocationMismatch { old, new }),
        (None, None) => Err(DiffError::IndexNotFound { side: Side::Both }),
        (None, Some(_)) => Err(DiffError::IndexNotFound { side: Side::Old }),
        (Some(_), None) => Err(DiffError::IndexNotFound { side: Side::New }),
    }
}

// ---------------------------------------------------------------------------
// Extent resolution
// ---------------------------------------------------------------------------

/// Determine the table's length from the record that describes the table.
///
/// Scans 16-byte strides from `offset` while a full record still precedes
/// the final record slot of the image. The first record whose start equals
/// `offset` must be byte-identical in both images; its end gives the extent.
pub fn resolve_extent(old: &[u8], new: &[u8], offset: usize) -> Result<DmaTable, DiffError> {
    let not_found = DiffError::IndexExtentNotFound { offset };
    let Ok(target) = u32::try_from(offset) else {
        return Err(not_found);
    };

    let limit = old.len().saturating_sub(ENTRY_SIZE);
    let found = (offset..limit)
        .step_by(ENTRY_SIZE)
        .find(|&pos| read_u32_be(old, pos) == Some(target));

    let Some(pos) = found else {
        return Err(not_found);
    };

    let old_raw = &old[pos..pos + ENTRY_SIZE];
    if new.get(pos..pos + ENTRY_SIZE) != Some(old_raw) {
        return Err(DiffError::IndexExtentMismatch {
            slot: (pos - offset) / ENTRY_SIZE,
            offset: pos,
        });
    }

    let extent = match read_u32_be(old_raw, 4).and_then(|end| end.checked_sub(target)) {
        Some(0) | None => return Err(not_found),
        Some(n) => n as usize,
    };

    if offset.saturating_add(extent) > old.len() {
        return Err(DiffError::IndexExtentOutOfBounds {
            offset,
            extent,
            len: old.len(),
        });
    }

    log::debug!(
        "dmadata extent {extent:#x} ({} slots) from record at {pos:#010x}",
        extent.div_ceil(ENTRY_SIZE)
    );
    Ok(DmaTable { offset, extent })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
