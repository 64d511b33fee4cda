// Per-entry findings and the sinks that consume them.
//
// The engine produces one `EntryReport` per table slot, in slot order, and
// hands it to a `ReportSink`. `TextReport` renders the familiar one-line
// warnings; `Vec<EntryReport>` simply collects them.

use std::io::{self, Write};

use bitflags::bitflags;

use crate::dmadata::{DmaTable, Region};
use crate::engine::DiffSummary;

bitflags! {
    /// What changed about one entry between the old and new image.
    ///
    /// An empty set means the entry is unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Changes: u8 {
        /// The region starts at a different offset.
        const RELOCATED = 1 << 0;
        /// The region has a different length.
        const RESIZED = 1 << 1;
        /// Same length, different bytes.
        const MODIFIED = 1 << 2;
    }
}

/// Classification of one table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryReport {
    /// Slot index within the table (the file number).
    pub slot: usize,
    pub changes: Changes,
    pub old: Region,
    pub new: Region,
}

impl EntryReport {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Receives the events of one diff run.
///
/// `entry` is called in ascending slot order. Unchanged entries are only
/// delivered when the run was asked to report them.
pub trait ReportSink {
    /// Called once the table has been located and sized in both images.
    fn table(&mut self, _table: &DmaTable) -> io::Result<()> {
        Ok(())
    }

    fn entry(&mut self, report: &EntryReport) -> io::Result<()>;

    /// Called after the last entry, with the run's totals.
    fn finish(&mut self, _summary: &DiffSummary) -> io::Result<()> {
        Ok(())
    }
}

impl ReportSink for Vec<EntryReport> {
    fn entry(&mut self, report: &EntryReport) -> io::Result<()> {
        self.push(*report);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn fmt_len(len: Option<u32>) -> String {
    match len {
        Some(n) => format!("{n:08x}"),
        None => "invalid".to_string(),
    }
}

/// Writes one line per finding, in the style of a diagnostic stream.
pub struct TextReport<W: Write> {
    out: W,
    quiet: bool,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, quiet: false }
    }

    /// Suppress informational lines; findings are still written.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn table(&mut self, table: &DmaTable) -> io::Result<()> {
        if !self.quiet {
            writeln!(self.out, "dmadata lives at {:08x}", table.offset)?;
        }
        Ok(())
    }

    fn entry(&mut self, r: &EntryReport) -> io::Result<()> {
        let i = r.slot;
        if r.is_unchanged() {
            return writeln!(
                self.out,
                "file {i} ({:08x} - {:08x}) unchanged",
                r.old.start, r.old.end
            );
        }
        if r.changes.contains(Changes::RELOCATED) {
            writeln!(
                self.out,
                "warning: file {i} was relocated ({:08x} -> {:08x})",
                r.old.start, r.new.start
            )?;
        }
        if r.changes.contains(Changes::RESIZED) {
            writeln!(
                self.out,
                "warning: file {i} was resized ({} -> {})",
                fmt_len(r.old.len()),
                fmt_len(r.new.len())
            )?;
        }
        if r.changes.contains(Changes::MODIFIED) {
            writeln!(
                self.out,
                "warning: file {i} ({:08x} - {:08x}) was modified",
                r.old.start, r.old.end
            )?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &DiffSummary) -> io::Result<()> {
        if summary.changed == 0 {
            let residual = summary.residual == Some(true);
            if self.quiet {
                if residual {
                    writeln!(self.out, "warning: blocks not referenced by dmadata differ")?;
                }
            } else {
                writeln!(self.out, "no files referenced by dmadata were modified")?;
                if residual {
                    writeln!(
                        self.out,
                        "(there are differences in blocks not referenced by dmadata, though!)"
                    )?;
                }
            }
        }
        self.out.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn report(changes: Changes, old: (u32, u32), new: (u32, u32)) -> EntryReport {
        EntryReport {
            slot: 7,
            changes,
            old: Region {
                start: old.0,
                end: old.1,
            },
            new: Region {
                start: new.0,
                end: new.1,
            },
        }
    }

    fn render(r: &EntryReport) -> String {
        let mut sink = TextReport::new(Vec::new());
        sink.entry(r).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn relocated_and_modified_lines() {
        let r = report(
            Changes::RELOCATED | Changes::MODIFIED,
            (0x1000, 0x1100),
            (0x2000, 0x2100),
        );
        assert_eq!(
            render(&r),
            "warning: file 7 was relocated (00001000 -> 00002000)\n\
             warning: file 7 (00001000 - 00001100) was modified\n"
        );
    }

    #[test]
    fn resized_with_invalid_length() {
        let r = report(Changes::RESIZED, (0x1000, 0x1100), (0x1000, 0x0800));
        assert_eq!(
            render(&r),
            "warning: file 7 was resized (00000100 -> invalid)\n"
        );
    }

    #[test]
    fn unchanged_line() {
        let r = report(Changes::empty(), (0x40, 0x80), (0x40, 0x80));
        assert_eq!(render(&r), "file 7 (00000040 - 00000080) unchanged\n");
    }

    #[test]
    fn quiet_suppresses_table_line() {
        let table = DmaTable {
            offset: 0x12F70,
            extent: 0x6490,
        };

        let mut sink = TextReport::new(Vec::new());
        sink.table(&table).unwrap();
        assert_eq!(sink.into_inner(), b"dmadata lives at 00012f70\n");

        let mut sink = TextReport::new(Vec::new()).quiet(true);
        sink.table(&table).unwrap();
        assert!(sink.into_inner().is_empty());
    }

    fn finish_text(quiet: bool, residual: Option<bool>) -> String {
        let summary = DiffSummary {
            table: DmaTable {
                offset: 0x2000,
                extent: 0x80,
            },
            entries: 8,
            changed: 0,
            relocated: 0,
            resized: 0,
            modified: 0,
            residual,
        };
        let mut sink = TextReport::new(Vec::new()).quiet(quiet);
        sink.finish(&summary).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn residual_lines() {
        assert_eq!(
            finish_text(false, Some(true)),
            "no files referenced by dmadata were modified\n\
             (there are differences in blocks not referenced by dmadata, though!)\n"
        );
        assert_eq!(
            finish_text(false, Some(false)),
            "no files referenced by dmadata were modified\n"
        );
    }

    #[test]
    fn quiet_residual_stands_alone() {
        assert_eq!(
            finish_text(true, Some(true)),
            "warning: blocks not referenced by dmadata differ\n"
        );
        assert_eq!(finish_text(true, Some(false)), "");
        assert_eq!(finish_text(true, None), "");
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<EntryReport> = Vec::new();
        for slot in 0..3 {
            sink.entry(&EntryReport {
                slot,
                ..report(Changes::MODIFIED, (0, 16), (0, 16))
            })
            .unwrap();
        }
        let slots: Vec<usize> = sink.iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
