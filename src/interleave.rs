// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! 32:2 interleave codec.
//!
//! Flash stores every 32 logical bytes followed by 2 metadata bytes, so a
//! physical block is 34 bytes long. Decoding strips the metadata pairs;
//! the first block of a window may start partway through a logical block.

use crate::config::{BLOCK_DATA, BLOCK_META, BLOCK_PHYS};
use crate::error::{RecoveryError, Result};

/// Physical offset holding the byte at `logical`.
pub const fn physical_offset_of(logical: u32) -> u32 {
    logical / BLOCK_DATA as u32 * BLOCK_PHYS as u32 + logical % BLOCK_DATA as u32
}

/// Physical window length conventionally read for `logical_len` bytes.
///
/// Equal to the physical offset of `logical_len`; large enough to decode
/// any record whose length is a multiple of the block size.
pub const fn physical_span(logical_len: usize) -> usize {
    logical_len / BLOCK_DATA * BLOCK_PHYS + logical_len % BLOCK_DATA
}

/// Position of `logical` inside its 32-byte block.
pub const fn offset_in_block(logical: u32) -> usize {
    (logical % BLOCK_DATA as u32) as usize
}

/// Minimum physical bytes needed to decode `logical_len` bytes starting
/// `start_in_block` bytes into a block.
pub fn required_physical_len(start_in_block: usize, logical_len: usize) -> usize {
    if logical_len == 0 {
        return 0;
    }
    let leading = BLOCK_DATA - start_in_block;
    if logical_len <= leading {
        return logical_len;
    }
    let rest = logical_len - leading;
    logical_len + BLOCK_META * (1 + (rest - 1) / BLOCK_DATA)
}

/// Decode `logical_len` bytes from a physical window.
///
/// `start_in_block` is the logical offset of the window's first byte modulo
/// 32; the first metadata pair sits `32 - start_in_block` bytes in.
pub fn decode(physical: &[u8], start_in_block: usize, logical_len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; logical_len];
    decode_into(physical, start_in_block, &mut out)?;
    Ok(out)
}

/// Decode into a caller-supplied buffer, filling it completely.
pub fn decode_into(physical: &[u8], start_in_block: usize, out: &mut [u8]) -> Result<()> {
    if start_in_block >= BLOCK_DATA {
        return Err(RecoveryError::InvalidLayout(format!(
            "start offset {start_in_block} is outside a {BLOCK_DATA}-byte block"
        )));
    }
    let need = required_physical_len(start_in_block, out.len());
    if physical.len() < need {
        return Err(RecoveryError::ShortRead {
            offset: 0,
            need,
            have: physical.len(),
        });
    }

    let mut src = 0;
    let mut dst = 0;
    let mut run = BLOCK_DATA - start_in_block;
    while dst < out.len() {
        let n = run.min(out.len() - dst);
        out[dst..dst + n].copy_from_slice(&physical[src..src + n]);
        dst += n;
        src += n + BLOCK_META;
        run = BLOCK_DATA;
    }
    Ok(())
}

/// Decode a whole dump starting at physical offset 0.
///
/// A trailing partial block keeps at most its 32 data bytes.
pub fn decode_stream(physical: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(physical.len() / BLOCK_PHYS * BLOCK_DATA + BLOCK_DATA);
    for block in physical.chunks(BLOCK_PHYS) {
        let n = block.len().min(BLOCK_DATA);
        out.extend_from_slice(&block[..n]);
    }
    out
}

/// Rebuild the physical encoding of a logical stream.
///
/// `meta` yields the metadata pair written after logical block `n`. Only
/// full blocks are followed by metadata.
pub fn encode<F>(logical: &[u8], mut meta: F) -> Vec<u8>
where
    F: FnMut(usize) -> [u8; BLOCK_META],
{
    let mut out = Vec::with_capacity(physical_span(logical.len()));
    for (n, block) in logical.chunks(BLOCK_DATA).enumerate() {
        out.extend_from_slice(block);
        if block.len() == BLOCK_DATA {
            out.extend_from_slice(&meta(n));
        }
    }
    out
}
