//! Extent-clone (reflink) capability.
//!
//! This module wraps the platform call that makes two file regions share
//! storage. Each target supplies one binding behind the [`ExtentClone`]
//! trait:
//!
//! | Platform | Whole file | Range |
//! |----------|------------|-------|
//! | Linux | `ioctl(FICLONE)` | `ioctl(FICLONERANGE)` |
//! | Windows + `reflink` | unsupported | `FSCTL_DUPLICATE_EXTENTS_TO_FILE` via `reflink-copy` |
//! | Other | unsupported | unsupported |
//!
//! A platform without the capability reports [`io::ErrorKind::Unsupported`].
//! Nothing here ever falls back to copying bytes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as platform;

#[cfg(all(windows, feature = "reflink"))]
mod block;
#[cfg(all(windows, feature = "reflink"))]
use block as platform;

#[cfg(not(any(target_os = "linux", all(windows, feature = "reflink"))))]
mod platform {
    use std::fs::File;
    use std::io;

    pub(super) fn clone_whole(_src: &File, _dst: &File) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    pub(super) fn clone_range(
        _src: &File,
        _dst: &File,
        _src_offset: u64,
        _dst_offset: u64,
        _length: u64,
    ) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

/// A binding to an extent-clone capability.
///
/// Implementations perform exactly one native call per method and return
/// its result untouched: success, an [`io::ErrorKind::Unsupported`] error
/// when the capability is absent, or the OS error otherwise. A failed call
/// must leave `dst` unmodified.
pub trait ExtentClone {
    /// Make all of `dst` share storage with all of `src`.
    fn clone_whole(&self, src: &File, dst: &File) -> io::Result<()>;

    /// Make `length` bytes of `dst` at `dst_offset` share storage with the
    /// bytes of `src` at `src_offset`.
    fn clone_range(
        &self,
        src: &File,
        dst: &File,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
    ) -> io::Result<()>;
}

/// The extent-clone binding for the current platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeClone;

impl ExtentClone for NativeClone {
    fn clone_whole(&self, src: &File, dst: &File) -> io::Result<()> {
        platform::clone_whole(src, dst)
    }

    fn clone_range(
        &self,
        src: &File,
        dst: &File,
        src_offset: u64,
        dst_offset: u64,
        length: u64,
    ) -> io::Result<()> {
        platform::clone_range(src, dst, src_offset, dst_offset, length)
    }
}

/// A binding that never clones.
///
/// Useful to force the deep-copy path, and what platforms without a
/// native capability get.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedClone;

impl ExtentClone for UnsupportedClone {
    fn clone_whole(&self, _src: &File, _dst: &File) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn clone_range(
        &self,
        _src: &File,
        _dst: &File,
        _src_offset: u64,
        _dst_offset: u64,
        _length: u64,
    ) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

/// Clone the whole of `src` into `dst`, replacing its contents.
///
/// On success `dst` is byte-identical to `src`, sharing storage with it.
/// The call either succeeds or leaves `dst` as it was.
///
/// # Errors
///
/// - [`Error::CapabilityUnsupported`] if the platform or filesystem cannot clone
/// - [`Error::CrossDevice`] if the handles are on different filesystems
/// - [`Error::PermissionDenied`] if `dst` is immutable or busy
/// - [`Error::Io`] for any other OS error
pub fn clone_whole(src: &File, dst: &File) -> Result<()> {
    clone_whole_with(&NativeClone, src, dst)
}

/// Clone `length` bytes of `src` at `src_offset` into `dst` at `dst_offset`.
///
/// Only that window of `dst` is overwritten. `length` must be non-zero;
/// "to end of source" is resolved by [`clone_or_copy`](crate::clone_or_copy).
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `length` is zero or an offset does not fit
/// a signed file offset, otherwise the same errors as [`clone_whole`].
pub fn clone_range(
    src: &File,
    dst: &File,
    src_offset: u64,
    dst_offset: u64,
    length: u64,
) -> Result<()> {
    clone_range_with(&NativeClone, src, dst, src_offset, dst_offset, length)
}

pub(crate) fn clone_whole_with<C: ExtentClone + ?Sized>(
    capability: &C,
    src: &File,
    dst: &File,
) -> Result<()> {
    let result = capability.clone_whole(src, dst);

    #[cfg(feature = "tracing")]
    match &result {
        Ok(()) => tracing::debug!("whole-file clone succeeded"),
        Err(e) => tracing::debug!(error = %e, "whole-file clone failed"),
    }

    result.map_err(Error::from_clone)
}

pub(crate) fn clone_range_with<C: ExtentClone + ?Sized>(
    capability: &C,
    src: &File,
    dst: &File,
    src_offset: u64,
    dst_offset: u64,
    length: u64,
) -> Result<()> {
    if length == 0 {
        return Err(Error::InvalidArgument(
            "ranged clone length must be greater than zero".into(),
        ));
    }
    check_offset("source offset", src_offset)?;
    check_offset("destination offset", dst_offset)?;
    check_offset("length", length)?;

    let result = capability.clone_range(src, dst, src_offset, dst_offset, length);

    #[cfg(feature = "tracing")]
    match &result {
        Ok(()) => tracing::debug!(src_offset, dst_offset, length, "ranged clone succeeded"),
        Err(e) => tracing::debug!(
            src_offset,
            dst_offset,
            length,
            error = %e,
            "ranged clone failed"
        ),
    }

    result.map_err(Error::from_clone)
}

/// Reject values that do not fit the platform's signed file offset.
pub(crate) fn check_offset(what: &str, value: u64) -> Result<()> {
    if i64::try_from(value).is_err() {
        return Err(Error::InvalidArgument(format!(
            "{what} {value} exceeds the maximum file offset"
        )));
    }
    Ok(())
}
