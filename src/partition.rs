// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Backward scan for FAL partition records near the end of the image.
//!
//! Records are accepted on their magic alone; there is no record-level
//! checksum to verify them against.

use crate::config::RecoveryConfig;
use crate::error::RecoveryError;
use crate::interleave::{decode, offset_in_block, physical_offset_of, physical_span};
use crate::io::FlashRead;
use crate::layout::PartitionRecord;
use crate::report::DiscoveredPartition;

/// Physical bytes read per partition candidate (68).
pub const PARTITION_WINDOW: usize = physical_span(PartitionRecord::SIZE);

/// Logical candidate addresses, from `size - 64` stepping back one record
/// width per attempt. Stops early rather than wrapping below zero.
pub fn candidates(size: u32, attempts: u32) -> impl Iterator<Item = u32> {
    (1..=attempts).map_while(move |k| {
        k.checked_mul(PartitionRecord::SIZE as u32)
            .and_then(|back| size.checked_sub(back))
    })
}

/// Decode the record whose logical image starts at `address`, if its
/// window is readable and carries the partition magic.
pub fn probe<F: FlashRead + ?Sized>(
    flash: &F,
    config: &RecoveryConfig,
    address: u32,
) -> Option<(PartitionRecord, [u8; PartitionRecord::SIZE])> {
    let physical = physical_offset_of(address);
    let window = match flash.read_storage(physical, PARTITION_WINDOW) {
        Ok(w) => w,
        Err(RecoveryError::ShortRead { have, .. }) => {
            tracing::debug!("Short read for partition candidate @ {:#x} ({} bytes)", physical, have);
            return None;
        }
        Err(e) => {
            tracing::warn!("Partition candidate @ {:#x} unreadable: {}", physical, e);
            return None;
        }
    };

    let mut raw = [0u8; PartitionRecord::SIZE];
    raw.copy_from_slice(&decode(&window, offset_in_block(address), PartitionRecord::SIZE).ok()?);
    if raw[..4] != config.partition_magic {
        return None;
    }
    Some((PartitionRecord::parse(&raw), raw))
}

/// Scan the last `partition_attempts` record slots of `image` and patch
/// every record found over the bytes at its candidate address.
pub fn scan_partitions<F: FlashRead + ?Sized>(
    flash: &F,
    config: &RecoveryConfig,
    image: &mut [u8],
) -> Vec<DiscoveredPartition> {
    let mut found = Vec::new();
    let size = image.len() as u32;

    for address in candidates(size, config.partition_attempts) {
        let Some((record, raw)) = probe(flash, config, address) else {
            continue;
        };

        tracing::info!(
            " - FAL partition '{}' ({:#08X}+{:#X})",
            record.part_name_str(),
            record.offset,
            record.length
        );
        let physical_bounds = (record.flash_name_str() == config.onchip_crc_flash_name).then(|| {
            let (offset, length) = record.physical_bounds();
            tracing::info!("    -> calculated physical bounds: ({:#08X}+{:#X})", offset, length);
            (offset, length)
        });

        let start = address as usize;
        image[start..start + PartitionRecord::SIZE].copy_from_slice(&raw);
        found.push(DiscoveredPartition {
            record,
            logical_address: address,
            physical_offset: physical_offset_of(address),
            physical_bounds,
        });
    }

    found
}
