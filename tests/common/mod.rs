// Synthetic ROM images shared by the integration tests.
//
// Layout mirrors a retail image at a smaller scale: header + IPL3 in
// [0, 0x1060), boot segment up to 0x2000, dmadata at 0x2000 with the
// makerom/boot/dmadata records in slots 0..3, then data files.

#![allow(dead_code)]

pub const ROM_SIZE: usize = 0x10000;
pub const BOOT_END: u32 = 0x1060;
pub const TABLE: usize = 0x2000;
pub const SLOTS: usize = 8;
pub const TABLE_END: usize = TABLE + SLOTS * 16;

/// Data files in slots 3.. as (start, end).
pub const FILES: [(u32, u32); 5] = [
    (0x3000, 0x3400),
    (0x3400, 0x3A00),
    (0x4000, 0x4100),
    (0x5000, 0x6000),
    (0x6000, 0x6000), // empty file
];

#[derive(Clone)]
pub struct Rom {
    pub data: Vec<u8>,
}

impl Rom {
    /// A complete image with every file filled with its own byte pattern.
    pub fn new() -> Self {
        Self::with_boot_end(BOOT_END)
    }

    pub fn with_boot_end(boot_end: u32) -> Self {
        let mut data: Vec<u8> = (0..ROM_SIZE).map(|i| (i.wrapping_mul(31) >> 3) as u8).collect();
        data[TABLE..TABLE_END].fill(0);
        let mut rom = Self { data };

        rom.record(0, [0, boot_end, 0, 0]);
        rom.record(1, [boot_end, 0x2000, boot_end, 0]);
        rom.record(2, [TABLE as u32, TABLE_END as u32, TABLE as u32, 0]);
        for (i, &(start, end)) in FILES.iter().enumerate() {
            rom.record(3 + i, [start, end, start, 0]);
            for (j, b) in rom.data[start as usize..end as usize].iter_mut().enumerate() {
                *b = (i as u8 + 1).wrapping_mul(17) ^ (j as u8);
            }
        }
        rom
    }

    pub fn record(&mut self, slot: usize, words: [u32; 4]) -> &mut Self {
        let at = TABLE + slot * 16;
        for (i, w) in words.iter().enumerate() {
            self.data[at + i * 4..at + i * 4 + 4].copy_from_slice(&w.to_be_bytes());
        }
        self
    }

    /// Move file `slot` to `to`, keeping its bytes and length.
    pub fn relocate(&mut self, slot: usize, to: u32) -> &mut Self {
        let (start, end) = FILES[slot - 3];
        let len = (end - start) as usize;
        let bytes = self.data[start as usize..end as usize].to_vec();
        self.data[to as usize..to as usize + len].copy_from_slice(&bytes);
        self.record(slot, [start, to + len as u32, to, 0])
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}
