//! Dmadiff: find out what moved or changed between two ROM images.
//!
//! N64 ROMs built from the Zelda engine carry a file table ("dmadata") of
//! 16-byte records, each pointing at one file inside the image. Dmadiff
//! locates that table in two versions of an image and reports, per file,
//! whether it was relocated, resized or modified, plus whether anything
//! outside the indexed files differs.
//!
//! The crate provides:
//! - Table discovery and record decoding (`dmadata`)
//! - The comparison itself (`engine`)
//! - Finding types and report sinks (`report`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use dmadiff::engine::{self, DiffOptions};
//! use dmadiff::report::TextReport;
//!
//! let old = std::fs::read("old.z64").unwrap();
//! let new = std::fs::read("new.z64").unwrap();
//!
//! let mut sink = TextReport::new(std::io::stderr());
//! let summary = engine::diff_images(&old, &new, &DiffOptions::default(), &mut sink).unwrap();
//! println!("{} of {} files changed", summary.changed, summary.entries);
//! ```

pub mod dmadata;
pub mod engine;
pub mod io;
pub mod report;
pub mod scan;

#[cfg(feature = "cli")]
pub mod cli;
