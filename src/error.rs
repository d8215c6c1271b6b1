//! Error types for cpr.
//!
//! This module provides the [`Error`] enum containing every failure a clone
//! or fallback copy can report, the flat [`ErrorCode`] used by front ends,
//! and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Validation | [`Error::InvalidArgument`] |
//! | Clone capability | [`Error::CapabilityUnsupported`], [`Error::CrossDevice`], [`Error::PermissionDenied`] |
//! | Fallback copy | [`Error::OutOfMemory`], [`Error::Io`], [`Error::SourceExhausted`] |
//! | Collaborators | [`Error::Preserve`] |

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for cpr operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while cloning or copying a byte range.
///
/// Variants that wrap an [`io::Error`] keep the originating errno, which is
/// available through [`Error::raw_os_error`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An argument was rejected before any I/O took place
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The extent-clone capability is missing or refused this combination
    /// of filesystem, handles and offsets
    #[error("Reflink not supported: {0}")]
    CapabilityUnsupported(#[source] io::Error),

    /// Source and destination live on different filesystems
    #[error("Source and destination are on different filesystems: {0}")]
    CrossDevice(#[source] io::Error),

    /// The destination is immutable, busy, or not writable by the caller
    #[error("Permission denied: {0}")]
    PermissionDenied(#[source] io::Error),

    /// The fallback block buffer could not be allocated
    #[error("Out of memory allocating a {block_size} byte copy buffer")]
    OutOfMemory {
        /// Requested buffer size
        block_size: usize,
    },

    /// Non-transient seek, read or write failure during a fallback copy
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-length copy reached the end of the source early
    ///
    /// The destination may hold the `copied` bytes written before the
    /// source ran out. They are not rolled back.
    #[error("Source ended after {copied} of {requested} requested bytes")]
    SourceExhausted {
        /// Number of bytes the caller asked for
        requested: u64,
        /// Number of bytes written before the source ran out
        copied: u64,
    },

    /// Failed to carry an attribute from the source over to the destination
    #[error("Failed to preserve {attribute}: {source}")]
    Preserve {
        /// Attribute being preserved (`ownership`, `timestamps`, `permissions`)
        attribute: &'static str,
        /// Underlying error
        source: io::Error,
    },
}

impl Error {
    /// Classify a failed extent-clone call.
    ///
    /// Nearly every errno FICLONE and FICLONERANGE produce means the clone
    /// *may* not be possible here, so they land in
    /// [`Error::CapabilityUnsupported`] where a deep copy is the sensible
    /// reaction. Cross-device and permission failures keep their own kinds.
    pub(crate) fn from_clone(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::Unsupported {
            return Self::CapabilityUnsupported(error);
        }

        classify_clone_error(error)
    }

    /// Classify a failed seek, read or write of the fallback copy.
    pub(crate) fn from_copy(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(error)
        } else {
            Self::Io(error)
        }
    }

    /// The flat code for this error, suitable for machine-readable output.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::CapabilityUnsupported(_) => ErrorCode::CapabilityUnsupported,
            Self::CrossDevice(_) => ErrorCode::CrossDevice,
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            Self::Io(_) => ErrorCode::IoError,
            Self::SourceExhausted { .. } => ErrorCode::SourceExhausted,
            Self::Preserve { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    ErrorCode::PermissionDenied
                } else {
                    ErrorCode::IoError
                }
            }
        }
    }

    /// The errno the failure originated from, when there was one.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::CapabilityUnsupported(e)
            | Self::CrossDevice(e)
            | Self::PermissionDenied(e)
            | Self::Io(e)
            | Self::Preserve { source: e, .. } => e.raw_os_error(),
            Self::InvalidArgument(_) | Self::OutOfMemory { .. } | Self::SourceExhausted { .. } => {
                None
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn classify_clone_error(error: io::Error) -> Error {
    match error.raw_os_error() {
        Some(libc::EXDEV) => Error::CrossDevice(error),
        Some(libc::EPERM | libc::EACCES | libc::ETXTBSY) => Error::PermissionDenied(error),
        Some(
            libc::EOPNOTSUPP
            | libc::ENOTTY
            | libc::ENOSYS
            | libc::EINVAL
            | libc::EBADF
            | libc::EISDIR,
        ) => Error::CapabilityUnsupported(error),
        Some(_) => Error::Io(error),
        None => classify_clone_kind(error),
    }
}

#[cfg(not(target_os = "linux"))]
fn classify_clone_error(error: io::Error) -> Error {
    classify_clone_kind(error)
}

// Bindings without an errno (block cloning, custom capabilities) fail for
// capability reasons alone.
fn classify_clone_kind(error: io::Error) -> Error {
    match error.kind() {
        io::ErrorKind::CrossesDevices => Error::CrossDevice(error),
        io::ErrorKind::PermissionDenied => Error::PermissionDenied(error),
        _ => Error::CapabilityUnsupported(error),
    }
}

/// Stable, machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Rejected argument
    InvalidArgument,
    /// Extent clone not available
    CapabilityUnsupported,
    /// Different filesystems
    CrossDevice,
    /// Insufficient rights or immutable destination
    PermissionDenied,
    /// Buffer allocation failed
    OutOfMemory,
    /// Other I/O failure
    IoError,
    /// Source shorter than the requested length
    SourceExhausted,
}

impl ErrorCode {
    /// Snake-case name of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::CapabilityUnsupported => "capability_unsupported",
            Self::CrossDevice => "cross_device",
            Self::PermissionDenied => "permission_denied",
            Self::OutOfMemory => "out_of_memory",
            Self::IoError => "io_error",
            Self::SourceExhausted => "source_exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
