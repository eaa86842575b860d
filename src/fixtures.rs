// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Synthetic flash dumps for tests.

use crate::config::{BLOCK_DATA, BLOCK_PHYS};
use crate::interleave::{encode, physical_span};
use crate::layout::{padded, HeaderRecord, PartitionRecord};

/// Logical size backing the default header sweep (physical 0x11000).
pub const DEFAULT_LOGICAL_LEN: usize = 0x10000;

/// Physical flash image plus the live memory view of the bootloader.
pub struct Fixture {
    pub flash: Vec<u8>,
    pub memory: Vec<u8>,
}

/// Builds a logical flash, places records in it, and encodes it.
///
/// Records placed with the builder land in flash only; `memory` keeps the
/// background pattern unless patched with [`FlashBuilder::live`].
pub struct FlashBuilder {
    logical: Vec<u8>,
    memory: Vec<u8>,
}

impl FlashBuilder {
    pub fn new(logical_len: usize) -> Self {
        let logical: Vec<u8> = (0..logical_len).map(|i| (i % 251) as u8).collect();
        Self {
            memory: logical.clone(),
            logical,
        }
    }

    /// Place `header` so its physical window ends at `end`.
    pub fn header_at_end(mut self, end: u32, header: &HeaderRecord) -> Self {
        let start = end as usize - physical_span(HeaderRecord::SIZE);
        let logical = start / BLOCK_PHYS * BLOCK_DATA + start % BLOCK_PHYS;
        self.write(logical, &header.to_bytes());
        self
    }

    pub fn flash_bytes(mut self, logical: u32, bytes: &[u8]) -> Self {
        self.write(logical as usize, bytes);
        self
    }

    pub fn partition(mut self, logical: u32, record: &PartitionRecord) -> Self {
        self.write(logical as usize, &record.to_bytes());
        self
    }

    /// Overwrite bytes of the live memory view only.
    pub fn live(mut self, address: u32, bytes: &[u8]) -> Self {
        let start = address as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn build(self) -> Fixture {
        Fixture {
            flash: encode(&self.logical, |n| [0xA5, n as u8]),
            memory: self.memory,
        }
    }

    fn write(&mut self, logical: usize, bytes: &[u8]) {
        self.logical[logical..logical + bytes.len()].copy_from_slice(bytes);
    }
}

impl Default for FlashBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LOGICAL_LEN)
    }
}

/// A header with a correct CRC declaring `size_raw` bytes.
pub fn sample_header(size_raw: u32) -> HeaderRecord {
    HeaderRecord {
        magic: *b"RBL\0",
        ota_alg: 0,
        timestamp: 1_650_000_000,
        name: padded("bootloader"),
        version: padded("1.00"),
        serial_number: padded("00000000"),
        crc: 0x1234_5678,
        hash: 0x9ABC_DEF0,
        size_raw,
        size_packaged: size_raw,
        header_crc: 0,
    }
    .seal()
}

pub fn sample_partition(name: &str, flash_name: &str, offset: u32, length: u32) -> PartitionRecord {
    PartitionRecord::new(*b"01PE", name, flash_name, offset, length)
}
