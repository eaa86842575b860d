// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Collaborator interfaces consumed by the pipeline.
//!
//! Reads are synchronous and either return every requested byte or fail
//! with [`RecoveryError::ShortRead`].

use crate::error::{RecoveryError, Result};

/// Raw (interleaved) flash, addressed by physical offset.
pub trait FlashRead {
    /// Physical size of the medium in bytes.
    fn flash_size(&self) -> u64;

    /// Read exactly `len` bytes starting at `offset`.
    fn read_storage(&self, offset: u32, len: usize) -> Result<Vec<u8>>;
}

/// Memory holding the resident (already decoded) bootloader.
pub trait LiveMemory {
    /// Fill `dst` from memory starting at `address`.
    fn read_live_memory(&self, address: u32, dst: &mut [u8]) -> Result<()>;
}

/// Bounds-checked window into a byte slice.
pub fn slice_at(bytes: &[u8], offset: u32, len: usize) -> Result<&[u8]> {
    let rest = bytes.get(offset as usize..).unwrap_or_default();
    rest.get(..len).ok_or(RecoveryError::ShortRead {
        offset,
        need: len,
        have: rest.len(),
    })
}

impl FlashRead for [u8] {
    fn flash_size(&self) -> u64 {
        self.len() as u64
    }

    fn read_storage(&self, offset: u32, len: usize) -> Result<Vec<u8>> {
        slice_at(self, offset, len).map(<[u8]>::to_vec)
    }
}

impl FlashRead for Vec<u8> {
    fn flash_size(&self) -> u64 {
        self.as_slice().flash_size()
    }

    fn read_storage(&self, offset: u32, len: usize) -> Result<Vec<u8>> {
        self.as_slice().read_storage(offset, len)
    }
}

impl<T: FlashRead + ?Sized> FlashRead for &T {
    fn flash_size(&self) -> u64 {
        (**self).flash_size()
    }

    fn read_storage(&self, offset: u32, len: usize) -> Result<Vec<u8>> {
        (**self).read_storage(offset, len)
    }
}

/// A slice is live memory mapped at address 0.
impl LiveMemory for [u8] {
    fn read_live_memory(&self, address: u32, dst: &mut [u8]) -> Result<()> {
        dst.copy_from_slice(slice_at(self, address, dst.len())?);
        Ok(())
    }
}

impl LiveMemory for Vec<u8> {
    fn read_live_memory(&self, address: u32, dst: &mut [u8]) -> Result<()> {
        self.as_slice().read_live_memory(address, dst)
    }
}

impl<T: LiveMemory + ?Sized> LiveMemory for &T {
    fn read_live_memory(&self, address: u32, dst: &mut [u8]) -> Result<()> {
        (**self).read_live_memory(address, dst)
    }
}
