#![no_main]
use dmadiff::dmadata::{TableFlavor, locate_table, resolve_extent};
use dmadiff::engine::{self, DiffOptions};
use dmadiff::report::EntryReport;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Table discovery on arbitrary bytes must never panic, only fail.
    if let Some(offset) = locate_table(data, TableFlavor::N64) {
        let _ = resolve_extent(data, data, offset);
    }

    // Diff the two halves against each other, with every entry reported.
    let half = data.len() / 2;
    let (old, new) = data.split_at(half);
    let new = &new[..half];
    let opts = DiffOptions {
        report_unchanged: true,
        ..Default::default()
    };
    let mut sink: Vec<EntryReport> = Vec::new();
    let _ = engine::diff_images(old, new, &opts, &mut sink);
    let _ = engine::diff(data, data);
});
