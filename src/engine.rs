//! Clone first, copy bytes if allowed.
//!
//! [`clone_or_copy`] tries exactly one extent clone for a request. If it
//! fails and [`CopyOptions::allow_fallback`] is set, the same range is
//! copied with [`deep_copy`] instead, and the clone error is dropped.

use crate::clone::{ExtentClone, NativeClone, check_offset, clone_range_with, clone_whole_with};
use crate::copy::deep_copy;
use crate::error::{Error, Result};
use crate::options::{CloneMode, CloneRequest, CopyOptions};
use std::io;

/// How a successful [`clone_or_copy`] was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The destination now shares extents with the source.
    Cloned,
    /// The bytes were copied, by the fallback or because there was nothing
    /// to clone.
    Copied {
        /// Bytes written to the destination
        bytes: u64,
    },
}

impl Outcome {
    /// Short name used in logs and machine-readable output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloned => "cloned",
            Self::Copied { .. } => "copied",
        }
    }
}

/// Clone `request` with the native capability, falling back to a deep copy
/// when `options` allow it.
///
/// A ranged request with `length == 0` covers everything from `src_offset`
/// to the current end of the source. If that is nothing, the call succeeds
/// with `Copied { bytes: 0 }` without touching either handle. A source that
/// reports no size (empty, a block device, a pseudo-file) cannot be cloned
/// to its end, so the clone is skipped and only the fallback can serve the
/// request.
///
/// The handles are never opened, truncated or closed here. A whole-file
/// fallback writes the source over the start of `dst` and leaves any longer
/// tail in place, so open whole-file destinations truncated.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if fallback is enabled with a zero block size
///   (reported before any I/O), or for offsets and lengths that do not fit
///   a signed file offset (reported before the clone attempt)
/// - without fallback, the clone error unchanged
/// - with fallback, whatever [`deep_copy`] reports
///
/// # Example
///
/// ```no_run
/// use cpr::{CloneRequest, CopyOptions, Outcome, clone_or_copy};
/// use std::fs::{File, OpenOptions};
///
/// let src = File::open("disk.img")?;
/// let dst = OpenOptions::new().write(true).create(true).open("disk.img.bak")?;
///
/// let request = CloneRequest::range(&src, &dst, 4096, 4096, 0);
/// match clone_or_copy(request, &CopyOptions::default().with_fallback())? {
///     Outcome::Cloned => println!("shared extents"),
///     Outcome::Copied { bytes } => println!("copied {bytes} bytes"),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn clone_or_copy(request: CloneRequest<'_>, options: &CopyOptions) -> Result<Outcome> {
    clone_or_copy_with(&NativeClone, request, options)
}

/// [`clone_or_copy`] against any [`ExtentClone`] binding.
///
/// Pass [`UnsupportedClone`](crate::UnsupportedClone) to always take the
/// deep-copy path.
///
/// # Errors
///
/// Same as [`clone_or_copy`].
pub fn clone_or_copy_with<C: ExtentClone + ?Sized>(
    capability: &C,
    request: CloneRequest<'_>,
    options: &CopyOptions,
) -> Result<Outcome> {
    options.validate()?;

    let (src_offset, dst_offset, length) = match request.mode {
        CloneMode::WholeFile => (0, 0, 0),
        CloneMode::Range {
            src_offset,
            dst_offset,
            length,
        } => (src_offset, dst_offset, length),
    };

    if let CloneMode::Range { .. } = request.mode {
        check_offset("source offset", src_offset)?;
        check_offset("destination offset", dst_offset)?;
        check_offset("length", length)?;
    }

    let cloned = match request.mode {
        CloneMode::WholeFile => clone_whole_with(capability, request.src, request.dst),
        CloneMode::Range { .. } => {
            let resolved = if length == 0 {
                remaining_len(request, src_offset)?
            } else {
                Some(length)
            };
            match resolved {
                Some(0) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(src_offset, "nothing left in source, skipping clone");
                    return Ok(Outcome::Copied { bytes: 0 });
                }
                Some(resolved) => clone_range_with(
                    capability,
                    request.src,
                    request.dst,
                    src_offset,
                    dst_offset,
                    resolved,
                ),
                None => Err(Error::CapabilityUnsupported(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "source size is unknown, cannot clone to its end",
                ))),
            }
        }
    };

    let clone_error = match cloned {
        Ok(()) => return Ok(Outcome::Cloned),
        Err(e) => e,
    };

    if !options.allow_fallback {
        return Err(clone_error);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        mode = request.mode.as_str(),
        error = %clone_error,
        block_size = options.block_size,
        "clone failed, falling back to deep copy"
    );

    let bytes = deep_copy(
        request.src,
        request.dst,
        src_offset,
        dst_offset,
        length,
        options.block_size,
    )?;

    Ok(Outcome::Copied { bytes })
}

/// Bytes between `src_offset` and the current end of the source.
///
/// `None` when the size cannot be trusted: block devices report no size,
/// and procfs/sysfs files are regular files that report zero whatever they
/// hold.
fn remaining_len(request: CloneRequest<'_>, src_offset: u64) -> Result<Option<u64>> {
    let meta = request.src.metadata().map_err(Error::from_copy)?;
    if !meta.is_file() || meta.len() == 0 {
        return Ok(None);
    }
    Ok(Some(meta.len().saturating_sub(src_offset)))
}

// =============================================================================
// Tests
// =============================================================================
