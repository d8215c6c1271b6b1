//! # cpr
//!
//! Clone a file, or a byte range of it, by sharing storage extents, and fall
//! back to a plain read/write copy when the filesystem cannot.
//!
//! ## Core Features
//!
//! - **Extent cloning**: `FICLONE`/`FICLONERANGE` on Linux (Btrfs, XFS, OCFS2, ...)
//! - **Range stitching**: clone part of one file into any offset of another
//! - **Opt-in fallback**: a buffered deep copy with the same offset/length rules
//! - **Signal safe**: interrupted reads and writes are retried, short writes resumed
//! - **Attribute preservation**: ownership, timestamps and permissions
//!
//! The library works on already-open [`File`](std::fs::File) handles. It never
//! opens, truncates or closes files itself.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cpr::{CloneRequest, CopyOptions, clone_or_copy};
//! use std::fs::{File, OpenOptions};
//!
//! let src = File::open("base.img")?;
//! let dst = OpenOptions::new().write(true).create_new(true).open("copy.img")?;
//!
//! let outcome = clone_or_copy(
//!     CloneRequest::whole_file(&src, &dst),
//!     &CopyOptions::default().with_fallback(),
//! )?;
//! println!("{}", outcome.as_str());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Clone Only
//!
//! Without fallback a failed clone is reported with its reason:
//!
//! ```no_run
//! use cpr::{Error, clone_range};
//! use std::fs::{File, OpenOptions};
//!
//! let src = File::open("a.bin")?;
//! let dst = OpenOptions::new().write(true).open("b.bin")?;
//!
//! match clone_range(&src, &dst, 0, 1 << 20, 4096) {
//!     Ok(()) => {}
//!     Err(Error::CrossDevice(_)) => eprintln!("different filesystems"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Length Zero
//!
//! Everywhere a length is taken, `0` means "up to the end of the source".
//! [`clone_range`] itself rejects it; [`clone_or_copy`] resolves it from the
//! source size and [`deep_copy`] reads until end of file.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for options, modes and outcomes |
//! | `reflink` | Windows block cloning via `reflink-copy` |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod clone;
mod copy;
mod engine;
mod error;
mod options;
mod preserve;

pub use clone::{ExtentClone, NativeClone, UnsupportedClone, clone_range, clone_whole};
pub use copy::deep_copy;
pub use engine::{Outcome, clone_or_copy, clone_or_copy_with};
pub use error::{Error, ErrorCode, Result};
pub use options::{CloneMode, CloneRequest, CopyOptions, DEFAULT_BLOCK_SIZE};
pub use preserve::{Preserve, preserve_attributes};
