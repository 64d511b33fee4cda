// Diff engine: compares two images through their dmadata tables.
//
// Orchestrates one run:
//   - Size check, then table location and extent resolution (dmadata module)
//   - Per-slot classification into relocated / resized / modified
//   - A whole-image residual comparison when no slot changed
//
// Every validation happens before the first entry reaches the sink, so an
// error never leaves a partial report behind.

use std::io;

use thiserror::Error;

use crate::dmadata::{DmaEntry, DmaTable, Side, TableFlavor, locate_pair, resolve_extent};
use crate::report::{Changes, EntryReport, ReportSink};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for a diff run.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Which magic identifies the start of the table.
    pub flavor: TableFlavor,
    /// Deliver unchanged entries to the sink as well.
    pub report_unchanged: bool,
    /// Compare the whole images when no entry changed.
    pub residual_check: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            flavor: TableFlavor::N64,
            report_unchanged: false,
            residual_check: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a pair of images cannot be compared.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("files are of different sizes ({old:#x} vs {new:#x} bytes)")]
    SizeMismatch { old: usize, new: usize },

    #[error("failed to find dmadata in {side}")]
    IndexNotFound { side: Side },

    #[error("dmadata at different addresses in each file ({old:08x} vs {new:08x})")]
    IndexLocationMismatch { old: usize, new: usize },

    #[error("failed to locate dmadata size: no record starts at {offset:08x}")]
    IndexExtentNotFound { offset: usize },

    #[error("dmadata length mismatch: record {slot} at {offset:08x} differs")]
    IndexExtentMismatch { slot: usize, offset: usize },

    #[error("dmadata at {offset:08x} (length {extent:#x}) runs past the end of the image ({len:#x} bytes)")]
    IndexExtentOutOfBounds {
        offset: usize,
        extent: usize,
        len: usize,
    },

    #[error("report output: {0}")]
    Report(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Totals for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub table: DmaTable,
    /// Slots walked.
    pub entries: usize,
    /// Slots with at least one change.
    pub changed: usize,
    pub relocated: usize,
    pub resized: usize,
    pub modified: usize,
    /// Whether bytes outside every entry differ; `None` if not checked.
    pub residual: Option<bool>,
}

impl DiffSummary {
    fn new(table: DmaTable) -> Self {
        Self {
            table,
            entries: 0,
            changed: 0,
            relocated: 0,
            resized: 0,
            modified: 0,
            residual: None,
        }
    }

    fn record(&mut self, r: &EntryReport) {
        self.entries += 1;
        if r.is_unchanged() {
            return;
        }
        self.changed += 1;
        self.relocated += r.changes.contains(Changes::RELOCATED) as usize;
        self.resized += r.changes.contains(Changes::RESIZED) as usize;
        self.modified += r.changes.contains(Changes::MODIFIED) as usize;
    }

    /// True if anything at all differs between the images.
    pub fn has_changes(&self) -> bool {
        self.changed > 0 || self.residual == Some(true)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Compare one entry of the old table against the same slot of the new one.
///
/// Content is only compared when both regions have the same non-zero length
/// and lie entirely inside their images.
pub fn classify_entry(
    old_image: &[u8],
    new_image: &[u8],
    slot: usize,
    old: DmaEntry,
    new: DmaEntry,
) -> EntryReport {
    let (a, b) = (old.region(), new.region());
    let mut changes = Changes::empty();

    if a.start != b.start {
        changes |= Changes::RELOCATED;
    }

    if a.len() != b.len() {
        changes |= Changes::RESIZED;
    } else if a.len().is_some_and(|n| n > 0) {
        match (a.bytes(old_image), b.bytes(new_image)) {
            (Some(x), Some(y)) => {
                if x != y {
                    changes |= Changes::MODIFIED;
                }
            }
            _ => log::warn!(
                "file {slot}: region {:08x}-{:08x} lies outside the image, content not compared",
                a.start,
                a.end
            ),
        }
    }

    log::trace!("file {slot}: {changes:?}");
    EntryReport {
        slot,
        changes,
        old: a,
        new: b,
    }
}

fn classify_slot(old: &[u8], new: &[u8], table: &DmaTable, slot: usize) -> Option<EntryReport> {
    match (table.entry(old, slot), table.entry(new, slot)) {
        (Some(a), Some(b)) => Some(classify_entry(old, new, slot, a, b)),
        _ => {
            log::warn!("file {slot}: record runs past the end of the image, skipped");
            None
        }
    }
}

/// Classify every slot of `table`, in slot order.
#[cfg(not(feature = "parallel"))]
fn classify_table(old: &[u8], new: &[u8], table: &DmaTable) -> Vec<EntryReport> {
    (0..table.slots())
        .filter_map(|slot| classify_slot(old, new, table, slot))
        .collect()
}

/// Classify every slot of `table` on the rayon pool. The collected order is
/// still slot order.
#[cfg(feature = "parallel")]
fn classify_table(old: &[u8], new: &[u8], table: &DmaTable) -> Vec<EntryReport> {
    (0..table.slots())
        .into_par_iter()
        .filter_map(|slot| classify_slot(old, new, table, slot))
        .collect()
}

// ---------------------------------------------------------------------------
// High-level diff
// ---------------------------------------------------------------------------

/// Compare `old` and `new` with default options, collecting the findings.
pub fn diff(old: &[u8], new: &[u8]) -> Result<(Vec<EntryReport>, DiffSummary), DiffError> {
    let mut findings: Vec<EntryReport> = Vec::new();
    let summary = diff_images(old, new, &DiffOptions::default(), &mut findings)?;
    Ok((findings, summary))
}

/// Compare two images and stream the findings to `sink`.
///
/// Fails before any entry is reported if the images differ in size, the
/// table cannot be found at one common offset, or its own record differs.
pub fn diff_images<S: ReportSink + ?Sized>(
    old: &[u8],
    new: &[u8],
    opts: &DiffOptions,
    sink: &mut S,
) -> Result<DiffSummary, DiffError> {
    if old.len() != new.len() {
        return Err(DiffError::SizeMismatch {
            old: old.len(),
            new: new.len(),
        });
    }

    let offset = locate_pair(old, new, opts.flavor)?;
    let table = resolve_extent(old, new, offset)?;
    sink.table(&table)?;

    let mut summary = DiffSummary::new(table);
    for report in classify_table(old, new, &table) {
        summary.record(&report);
        if !report.is_unchanged() || opts.report_unchanged {
            sink.entry(&report)?;
        }
    }

    if summary.changed == 0 && opts.residual_check {
        summary.residual = Some(old != new);
    }

    log::debug!(
        "walked {} entries: {} changed ({} relocated, {} resized, {} modified)",
        summary.entries,
        summary.changed,
        summary.relocated,
        summary.resized,
        summary.modified
    );

    sink.finish(&summary)?;
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
