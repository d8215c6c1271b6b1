//! Carry ownership, timestamps and permissions from one handle to another.
//!
//! This sits outside clone-or-copy: callers run it after the data has
//! landed, when they want the destination to look like the source.

use crate::error::{Error, Result};
use filetime::FileTime;
use std::fs::File;

/// Which attributes [`preserve_attributes`] should copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Preserve {
    /// Owning user and group (Unix only)
    pub owner: bool,
    /// Access and modification times
    pub times: bool,
    /// Permission bits
    pub permissions: bool,
}

impl Preserve {
    /// Preserve everything.
    pub const ALL: Self = Self {
        owner: true,
        times: true,
        permissions: true,
    };

    /// Preserve nothing.
    pub const NONE: Self = Self {
        owner: false,
        times: false,
        permissions: false,
    };

    /// Whether any attribute is selected.
    #[must_use]
    pub fn any(&self) -> bool {
        self.owner || self.times || self.permissions
    }
}

/// Copy the selected attributes of `src` onto `dst`.
///
/// `src` is stat'ed once. Ownership is applied first, then timestamps, then
/// permissions, so a permission change cannot lock out the earlier steps.
/// The first failure stops the sequence.
///
/// # Errors
///
/// [`Error::Preserve`] naming the attribute that could not be applied, or
/// [`Error::Io`] if `src` cannot be stat'ed.
pub fn preserve_attributes(src: &File, dst: &File, preserve: Preserve) -> Result<()> {
    if !preserve.any() {
        return Ok(());
    }

    let meta = src.metadata()?;

    if preserve.owner {
        set_owner(dst, &meta).map_err(|source| Error::Preserve {
            attribute: "ownership",
            source,
        })?;
    }

    if preserve.times {
        let atime = FileTime::from_last_access_time(&meta);
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_handle_times(dst, Some(atime), Some(mtime)).map_err(|source| {
            Error::Preserve {
                attribute: "timestamps",
                source,
            }
        })?;
    }

    if preserve.permissions {
        dst.set_permissions(meta.permissions())
            .map_err(|source| Error::Preserve {
                attribute: "permissions",
                source,
            })?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(?preserve, "attributes preserved");

    Ok(())
}

#[cfg(unix)]
fn set_owner(dst: &File, meta: &std::fs::Metadata) -> std::io::Result<()> {
    use std::os::unix::fs::MetadataExt;

    std::os::unix::fs::fchown(dst, Some(meta.uid()), Some(meta.gid()))
}

#[cfg(not(unix))]
fn set_owner(_dst: &File, _meta: &std::fs::Metadata) -> std::io::Result<()> {
    Ok(())
}
