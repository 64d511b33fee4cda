// File-level helpers for comparing ROM images.
//
// Provides `load_image()` and the `diff_files()` convenience wrapper. Images
// are read fully into memory. Optionally computes a SHA-256 digest of each
// image (feature-gated behind `file-io`).

use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::engine::{self, DiffError, DiffOptions, DiffSummary};
use crate::report::ReportSink;

// ---------------------------------------------------------------------------
// Loaded image
// ---------------------------------------------------------------------------

/// A ROM image read from disk.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub data: Vec<u8>,
    /// SHA-256 of `data` (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

impl LoadedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lowercase hex of the SHA-256 digest, when one was computed.
    pub fn digest_hex(&self) -> Option<String> {
        self.sha256
            .map(|d| d.iter().map(|b| format!("{b:02x}")).collect())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to read one image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load '{}': file is empty", .path.display())]
    Empty { path: PathBuf },
}

/// Error type for `diff_files()`.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Diff(#[from] DiffError),
}

// ---------------------------------------------------------------------------
// load_image
// ---------------------------------------------------------------------------

/// Read a whole image into memory.
///
/// An empty file is treated as a load failure.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if data.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    #[cfg(feature = "file-io")]
    let sha256 = Some(sha2::Sha256::digest(&data).into());
    #[cfg(not(feature = "file-io"))]
    let sha256: Option<[u8; 32]> = None;

    log::debug!("loaded {} ({} bytes)", path.display(), data.len());

    Ok(LoadedImage {
        path: path.to_path_buf(),
        data,
        sha256,
    })
}

// ---------------------------------------------------------------------------
// diff_files
// ---------------------------------------------------------------------------

/// Load two images from disk and compare them, streaming findings to `sink`.
pub fn diff_files<S: ReportSink + ?Sized>(
    old_path: &Path,
    new_path: &Path,
    opts: &DiffOptions,
    sink: &mut S,
) -> Result<DiffSummary, IoError> {
    let old = load_image(old_path)?;
    let new = load_image(new_path)?;
    Ok(engine::diff_images(&old.data, &new.data, opts, sink)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
