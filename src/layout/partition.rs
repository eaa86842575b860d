// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use byteorder::{ByteOrder, LittleEndian};
use std::borrow::Cow;

use crate::error::{RecoveryError, Result};
use crate::config::{BLOCK_DATA, BLOCK_PHYS};
use crate::layout::{array, padded, text};

/// FAL partition table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRecord {
    pub magic: [u8; 4],
    pub part_name: [u8; 24],
    pub flash_name: [u8; 24],
    pub offset: u32,
    pub length: u32,
    pub reserved: u32,
}

impl PartitionRecord {
    pub const SIZE: usize = 4 + 24 + 24 + 4 * 3; // 64 bytes

    pub fn new(magic: [u8; 4], part_name: &str, flash_name: &str, offset: u32, length: u32) -> Self {
        Self {
            magic,
            part_name: padded(part_name),
            flash_name: padded(flash_name),
            offset,
            length,
            reserved: 0,
        }
    }

    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            magic: array(&buf[0..4]),
            part_name: array(&buf[4..28]),
            flash_name: array(&buf[28..52]),
            offset: LittleEndian::read_u32(&buf[52..56]),
            length: LittleEndian::read_u32(&buf[56..60]),
            reserved: LittleEndian::read_u32(&buf[60..64]),
        }
    }

    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        let fixed: &[u8; Self::SIZE] = buf
            .get(..Self::SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(RecoveryError::ShortRead {
                offset: 0,
                need: Self::SIZE,
                have: buf.len(),
            })?;
        Ok(Self::parse(fixed))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..28].copy_from_slice(&self.part_name);
        buf[28..52].copy_from_slice(&self.flash_name);
        LittleEndian::write_u32(&mut buf[52..56], self.offset);
        LittleEndian::write_u32(&mut buf[56..60], self.length);
        LittleEndian::write_u32(&mut buf[60..64], self.reserved);
        buf
    }

    pub fn part_name_str(&self) -> Cow<'_, str> {
        text(&self.part_name)
    }

    pub fn flash_name_str(&self) -> Cow<'_, str> {
        text(&self.flash_name)
    }

    /// `(offset, length)` re-expressed in interleaved flash units.
    ///
    /// Only whole blocks are counted, so a length that is not a multiple
    /// of 32 drops its tail. Widened to `u64`: erased fields (`0xFFFFFFFF`)
    /// exceed 32 bits once interleaved.
    pub fn physical_bounds(&self) -> (u64, u64) {
        let whole = |v: u32| u64::from(v) / BLOCK_DATA as u64 * BLOCK_PHYS as u64;
        (whole(self.offset), whole(self.length))
    }
}
