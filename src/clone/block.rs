//! Block-clone binding through `reflink-copy` (ReFS and Dev Drives).
//!
//! Windows can only duplicate extents into an existing region of the
//! destination, so `dst` must already be large enough, and both offsets and
//! the length must be cluster aligned. There is no handle-to-handle
//! whole-file clone.

use std::fs::File;
use std::io;
use std::num::NonZeroU64;

pub(super) fn clone_whole(_src: &File, _dst: &File) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

pub(super) fn clone_range(
    src: &File,
    dst: &File,
    src_offset: u64,
    dst_offset: u64,
    length: u64,
) -> io::Result<()> {
    let length = NonZeroU64::new(length).ok_or(io::ErrorKind::InvalidInput)?;

    reflink_copy::ReflinkBlockBuilder::new(src, dst, length)
        .from_offset(src_offset)
        .to_offset(dst_offset)
        .reflink_block()
}
