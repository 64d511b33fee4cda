// dmadata: the ROM's file table.
//
// A run of 16-byte records, one per file, with no header or length field.
// The table is found by its fixed first entries and sized by the record
// that describes the table itself.

pub mod entry;
pub mod locate;

pub use entry::{DmaEntry, ENTRY_SIZE, Region, read_u32_be};
pub use locate::{DmaTable, Side, TableFlavor, locate_pair, locate_table, resolve_extent};
