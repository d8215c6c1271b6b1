//! Byte-level fallback copy.
//!
//! When extents cannot be shared, [`deep_copy`] reproduces the same range
//! with plain reads and writes through a single reusable buffer. It keeps
//! the offset/length conventions of the clone calls, so a request means
//! the same thing whichever path serves it.

use crate::clone::check_offset;
use crate::error::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Copy a byte range from `src` to `dst` with read/write calls.
///
/// Both handles are positioned absolutely first: `src` at `src_offset`,
/// `dst` at `dst_offset`. Then the bytes are moved through one buffer of
/// `block_size` bytes.
///
/// # Length
///
/// - `length > 0` copies exactly `length` bytes. If the source ends first
///   the copy fails with [`Error::SourceExhausted`].
/// - `length == 0` copies everything from `src_offset` to the end of the
///   source, which may be nothing.
///
/// Reads and writes interrupted by a signal are retried in place, and short
/// writes are resumed from the unwritten remainder. Bytes of `dst` outside
/// `[dst_offset, dst_offset + copied)` are never touched.
///
/// # Returns
///
/// The number of bytes copied.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `block_size` is zero or an offset does not
///   fit a signed file offset (checked before any seek)
/// - [`Error::OutOfMemory`] if the buffer cannot be allocated
/// - [`Error::SourceExhausted`] if a fixed-length copy ran out of source
/// - [`Error::PermissionDenied`] or [`Error::Io`] for seek/read/write failures
///
/// A failed copy may have already written some blocks to `dst`. They are
/// left in place.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
///
/// let mut src = Cursor::new(b"hello world".to_vec());
/// let mut dst = Cursor::new(vec![b'.'; 8]);
///
/// // Copy "world" into the destination at offset 2
/// let copied = cpr::deep_copy(&mut src, &mut dst, 6, 2, 5, 4)?;
///
/// assert_eq!(copied, 5);
/// assert_eq!(dst.get_ref().as_slice(), b"..world.");
/// # Ok::<(), cpr::Error>(())
/// ```
pub fn deep_copy<R, W>(
    mut src: R,
    mut dst: W,
    src_offset: u64,
    dst_offset: u64,
    length: u64,
    block_size: usize,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write + Seek,
{
    if block_size == 0 {
        return Err(Error::InvalidArgument(
            "copy block size must be greater than zero".into(),
        ));
    }
    check_offset("source offset", src_offset)?;
    check_offset("destination offset", dst_offset)?;

    src.seek(SeekFrom::Start(src_offset))
        .map_err(Error::from_copy)?;
    dst.seek(SeekFrom::Start(dst_offset))
        .map_err(Error::from_copy)?;

    let mut block = allocate_block(block_size)?;

    // In copy-to-end mode `remaining` only sizes the reads; end of source
    // ends the loop.
    let mut remaining = if length != 0 {
        length
    } else {
        block_size as u64
    };
    let mut copied: u64 = 0;

    while remaining > 0 {
        let want = usize::try_from(remaining).map_or(block_size, |r| r.min(block_size));
        let read = read_block(&mut src, &mut block[..want])?;

        if read == 0 {
            if length == 0 {
                break;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(requested = length, copied, "source ended early");
            return Err(Error::SourceExhausted {
                requested: length,
                copied,
            });
        }

        write_block(&mut dst, &block[..read])?;
        copied += read as u64;

        if length != 0 {
            remaining -= read as u64;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(src_offset, dst_offset, copied, block_size, "deep copy finished");

    Ok(copied)
}

fn allocate_block(block_size: usize) -> Result<Vec<u8>> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(block_size)
        .map_err(|_| Error::OutOfMemory { block_size })?;
    block.resize(block_size, 0);
    Ok(block)
}

/// Read once, retrying only when interrupted.
fn read_block<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match src.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::from_copy(e)),
        }
    }
}

/// Write all of `block`, resuming after short or interrupted writes.
fn write_block<W: Write>(dst: &mut W, mut block: &[u8]) -> Result<()> {
    while !block.is_empty() {
        match dst.write(block) {
            Ok(0) => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "destination accepted no bytes",
                )));
            }
            Ok(n) => block = &block[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::from_copy(e)),
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
