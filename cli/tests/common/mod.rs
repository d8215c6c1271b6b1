//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding one source and one destination path.
pub struct TestFixture {
    pub dir: TempDir,
    pub src: PathBuf,
    pub dst: PathBuf,
}

impl TestFixture {
    /// Create a fixture whose source holds `data` and whose destination
    /// does not exist yet.
    pub fn new(data: &[u8]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, data).expect("Failed to write source");
        Self { dir, src, dst }
    }

    /// Create the destination with `data`.
    pub fn with_dst(self, data: &[u8]) -> Self {
        fs::write(&self.dst, data).expect("Failed to write destination");
        self
    }

    /// Read the destination back.
    pub fn dst_bytes(&self) -> Vec<u8> {
        fs::read(&self.dst).expect("Failed to read destination")
    }
}

/// Deterministic pseudo-random bytes.
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}
