//! FICLONE / FICLONERANGE binding.
//!
//! Both ioctls are issued on the destination descriptor. The kernel
//! rejects them with `EOPNOTSUPP`, `EINVAL`, `EXDEV` and friends when the
//! filesystem (Btrfs, XFS with reflink, OCFS2, ...) or the offsets do not
//! allow sharing extents.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

pub(super) fn clone_whole(src: &File, dst: &File) -> io::Result<()> {
    // SAFETY: both descriptors belong to `File`s borrowed for the whole call.
    let ret = unsafe { libc::ioctl(dst.as_raw_fd(), libc::FICLONE as _, src.as_raw_fd()) };

    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

pub(super) fn clone_range(
    src: &File,
    dst: &File,
    src_offset: u64,
    dst_offset: u64,
    length: u64,
) -> io::Result<()> {
    let range = libc::file_clone_range {
        src_fd: src.as_raw_fd().into(),
        src_offset,
        src_length: length,
        dest_offset: dst_offset,
    };

    // SAFETY: `range` outlives the call and the descriptors are borrowed
    // from live `File`s.
    let ret = unsafe {
        libc::ioctl(
            dst.as_raw_fd(),
            libc::FICLONERANGE as _,
            &range as *const libc::file_clone_range,
        )
    };

    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
