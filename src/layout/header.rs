// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use byteorder::{ByteOrder, LittleEndian};
use std::borrow::Cow;

use crate::checksum::ChecksumStatus;
use crate::error::{RecoveryError, Result};
use crate::layout::{array, text};

/// RBL bootloader header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub magic: [u8; 4],
    pub ota_alg: u32,
    pub timestamp: u32,
    pub name: [u8; 16],
    pub version: [u8; 24],
    pub serial_number: [u8; 24],
    pub crc: u32,
    pub hash: u32,
    pub size_raw: u32,
    pub size_packaged: u32,
    pub header_crc: u32,
}

impl HeaderRecord {
    pub const SIZE: usize = 4 + 4 + 4 + 16 + 24 + 24 + 4 * 5; // 96 bytes
    /// Bytes covered by `header_crc`: everything before it.
    pub const CHECKSUM_RANGE: usize = Self::SIZE - 4;

    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            magic: array(&buf[0..4]),
            ota_alg: LittleEndian::read_u32(&buf[4..8]),
            timestamp: LittleEndian::read_u32(&buf[8..12]),
            name: array(&buf[12..28]),
            version: array(&buf[28..52]),
            serial_number: array(&buf[52..76]),
            crc: LittleEndian::read_u32(&buf[76..80]),
            hash: LittleEndian::read_u32(&buf[80..84]),
            size_raw: LittleEndian::read_u32(&buf[84..88]),
            size_packaged: LittleEndian::read_u32(&buf[88..92]),
            header_crc: LittleEndian::read_u32(&buf[92..96]),
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
        LittleEndian::write_u32(&mut buf[4..8], self.ota_alg);
        LittleEndian::write_u32(&mut buf[8..12], self.timestamp);
        buf[12..28].copy_from_slice(&self.name);
        buf[28..52].copy_from_slice(&self.version);
        buf[52..76].copy_from_slice(&self.serial_number);
        LittleEndian::write_u32(&mut buf[76..80], self.crc);
        LittleEndian::write_u32(&mut buf[80..84], self.hash);
        LittleEndian::write_u32(&mut buf[84..88], self.size_raw);
        LittleEndian::write_u32(&mut buf[88..92], self.size_packaged);
        LittleEndian::write_u32(&mut buf[92..96], self.header_crc);
        buf
    }

    /// Compare the stored header CRC against the CRC of the preceding bytes.
    pub fn checksum_status(&self) -> ChecksumStatus {
        ChecksumStatus::check(&self.to_bytes()[..Self::CHECKSUM_RANGE], self.header_crc)
    }

    /// Recompute `header_crc` from the other fields.
    pub fn seal(mut self) -> Self {
        self.header_crc = self.checksum_status().computed;
        self
    }

    pub fn magic_str(&self) -> Cow<'_, str> {
        text(&self.magic)
    }

    pub fn name_str(&self) -> Cow<'_, str> {
        text(&self.name)
    }

    pub fn version_str(&self) -> Cow<'_, str> {
        text(&self.version)
    }

    pub fn serial_number_str(&self) -> Cow<'_, str> {
        text(&self.serial_number)
    }
}
