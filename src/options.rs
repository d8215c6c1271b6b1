//! Request and option types for clone operations.
//!
//! This module provides [`CloneRequest`] and [`CloneMode`], which describe
//! *what* to clone, and [`CopyOptions`], which controls *how* a failed clone
//! is handled.
//!
//! # Example
//!
//! ```
//! use cpr::CopyOptions;
//!
//! // Fall back to a read/write copy using 64 KiB blocks
//! let options = CopyOptions::default()
//!     .with_fallback()
//!     .with_block_size(64 * 1024);
//! ```

use crate::error::{Error, Result};
use std::fs::File;

/// Default block size for the fallback copy, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Which part of the source to clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CloneMode {
    /// Make the destination an exact duplicate of the whole source.
    #[default]
    WholeFile,
    /// Stitch `length` bytes of the source at `src_offset` into the
    /// destination at `dst_offset`.
    ///
    /// A `length` of zero means "up to the end of the source".
    Range {
        /// Offset into the source to begin from
        src_offset: u64,
        /// Offset into the destination to begin writing
        dst_offset: u64,
        /// Number of bytes, or zero for "to end of source"
        length: u64,
    },
}

impl CloneMode {
    /// Shorthand for [`CloneMode::Range`].
    #[must_use]
    pub fn range(src_offset: u64, dst_offset: u64, length: u64) -> Self {
        Self::Range {
            src_offset,
            dst_offset,
            length,
        }
    }

    /// Short name used in logs and machine-readable output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WholeFile => "whole_file",
            Self::Range { .. } => "range",
        }
    }
}

/// A single clone-or-copy request over two borrowed handles.
///
/// The request owns nothing. `src` must be open for reading and `dst` for
/// writing; opening, truncating and closing them is the caller's business.
#[derive(Debug, Clone, Copy)]
pub struct CloneRequest<'a> {
    /// Source handle
    pub src: &'a File,
    /// Destination handle
    pub dst: &'a File,
    /// Whole file or byte range
    pub mode: CloneMode,
}

impl<'a> CloneRequest<'a> {
    /// Request a whole-file clone of `src` into `dst`.
    #[must_use]
    pub fn whole_file(src: &'a File, dst: &'a File) -> Self {
        Self {
            src,
            dst,
            mode: CloneMode::WholeFile,
        }
    }

    /// Request a ranged clone of `src` into `dst`.
    #[must_use]
    pub fn range(
        src: &'a File,
        dst: &'a File,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
    ) -> Self {
        Self {
            src,
            dst,
            mode: CloneMode::range(src_offset, dst_offset, length),
        }
    }
}

/// Options for [`clone_or_copy`](crate::clone_or_copy).
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `allow_fallback` | `false` | Report clone failures as-is |
/// | `block_size` | 8192 | Fallback copy buffer size |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Fall back to a deep read/write copy when the clone fails (default: false)
    ///
    /// Falling back hides why the clone failed. Leave this off if the
    /// reason matters to you.
    pub allow_fallback: bool,

    /// Size of the buffer used by the fallback copy (default: 8192)
    ///
    /// Must be non-zero when `allow_fallback` is set. Ignored otherwise.
    pub block_size: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            allow_fallback: false,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl CopyOptions {
    /// Enable the deep-copy fallback
    #[must_use]
    pub fn with_fallback(mut self) -> Self {
        self.allow_fallback = true;
        self
    }

    /// Disable the deep-copy fallback
    #[must_use]
    pub fn without_fallback(mut self) -> Self {
        self.allow_fallback = false;
        self
    }

    /// Set the fallback block size
    ///
    /// Zero is accepted here and rejected by [`CopyOptions::validate`] when
    /// fallback is enabled.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Check the options before any I/O is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if fallback is enabled with a zero
    /// block size.
    pub fn validate(&self) -> Result<()> {
        if self.allow_fallback && self.block_size == 0 {
            return Err(Error::InvalidArgument(
                "fallback block size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
