// dmadata records.
//
// Each record is 16 bytes, four big-endian u32 words:
//   [0..4)   record start (virtual start)
//   [4..8)   record end (virtual end)
//   [8..12)  physical start
//   [12..16) physical end (0 when stored uncompressed)

/// Size of one dmadata record in bytes.
pub const ENTRY_SIZE: usize = 16;

/// Read a big-endian `u32` at `offset`, or `None` if it would run past `data`.
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes: [u8; 4] = data.get(offset..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// One decoded dmadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmaEntry {
    pub record_start: u32,
    pub record_end: u32,
    pub phys_start: u32,
    pub phys_end: u32,
}

impl DmaEntry {
    /// Decode a record from the first 16 bytes of `raw`.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < ENTRY_SIZE {
            return None;
        }
        Some(Self {
            record_start: read_u32_be(raw, 0)?,
            record_end: read_u32_be(raw, 4)?,
            phys_start: read_u32_be(raw, 8)?,
            phys_end: read_u32_be(raw, 12)?,
        })
    }

    /// Decode the record at absolute byte `offset` in `image`.
    pub fn read_at(image: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(ENTRY_SIZE)?;
        image.get(offset..end).and_then(Self::parse)
    }

    /// The byte range this entry covers in the image.
    ///
    /// Starts at the physical start and ends at the record end, which is
    /// where a file stored uncompressed ends once placed in the ROM.
    pub fn region(&self) -> Region {
        Region {
            start: self.phys_start,
            end: self.record_end,
        }
    }
}

/// A `[start, end)` byte range referenced by a dmadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub end: u32,
}

impl Region {
    /// Length in bytes; `None` when `end` precedes `start`.
    #[inline]
    pub fn len(&self) -> Option<u32> {
        self.end.checked_sub(self.start)
    }

    /// True when the region has a valid, zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Borrow the region's bytes, or `None` if it is malformed or out of bounds.
    pub fn bytes<'a>(&self, image: &'a [u8]) -> Option<&'a [u8]> {
        self.len()?;
        image.get(self.start as usize..self.end as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
