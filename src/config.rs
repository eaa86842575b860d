// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Logical data bytes per interleave block.
pub const BLOCK_DATA: usize = 32;

/// Metadata bytes trailing every full interleave block.
pub const BLOCK_META: usize = 2;

/// Physical size of one interleave block (BLOCK_DATA + BLOCK_META).
pub const BLOCK_PHYS: usize = BLOCK_DATA + BLOCK_META;

/// Largest bootloader payload accepted from a header (64 KiB).
pub const SIZE_CEILING: u32 = 0x10000;

/// Flash name marking a partition whose storage uses the 32:2 encoding.
pub const ONCHIP_CRC_FLASH_NAME: &str = "beken_onchip_crc";

/// Candidate end offsets for the header record.
///
/// The header is read so that its physical window ends at each offset in
/// `first..=last`, advancing by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSweep {
    pub first: u32,
    pub last: u32,
    pub step: u32,
}

impl HeaderSweep {
    /// Candidate end offsets in search order.
    pub fn candidates(&self) -> impl Iterator<Item = u32> {
        let HeaderSweep { first, last, step } = *self;
        let step = step.max(1);
        let count = if last < first { 0 } else { (last - first) / step + 1 };
        (0..count).map(move |i| first + i * step)
    }

    pub fn len(&self) -> usize {
        self.candidates().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HeaderSweep {
    fn default() -> Self {
        Self {
            first: 0xEE00,
            last: 0x11000,
            step: 0x1100,
        }
    }
}

/// Immutable tables driving one reconstruction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    pub header_magic: [u8; 4],
    pub header_sweep: HeaderSweep,
    pub size_ceiling: u32,
    /// Address of the resident bootloader in live memory.
    pub live_base: u32,
    pub marker: [u8; 8],
    /// Logical offset of the hardware marker inside the bootloader.
    pub marker_logical_offset: u32,
    pub partition_magic: [u8; 4],
    /// Number of record-width steps the partition scanner takes back from the image end.
    pub partition_attempts: u32,
    pub onchip_crc_flash_name: String,
    pub fallback_dump_base: u32,
    pub fallback_dump_len: u32,
    pub dump_bytes_per_line: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            header_magic: *b"RBL\0",
            header_sweep: HeaderSweep::default(),
            size_ceiling: SIZE_CEILING,
            live_base: 0x0,
            marker: *b"BK7231\0\0",
            marker_logical_offset: 0x100,
            partition_magic: *b"01PE",
            partition_attempts: 10,
            onchip_crc_flash_name: ONCHIP_CRC_FLASH_NAME.to_string(),
            fallback_dump_base: 0x0,
            fallback_dump_len: 0xFFFF,
            dump_bytes_per_line: 16,
        }
    }
}
