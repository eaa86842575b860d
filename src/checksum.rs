// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! CRC-32 (IEEE) over byte ranges.

use crc32fast::Hasher;

pub fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

pub fn validate(bytes: &[u8], expected: u32) -> bool {
    checksum(bytes) == expected
}

/// Result of checking a record against its stored checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumStatus {
    pub stored: u32,
    pub computed: u32,
}

impl ChecksumStatus {
    pub fn check(bytes: &[u8], stored: u32) -> Self {
        Self {
            stored,
            computed: checksum(bytes),
        }
    }

    pub fn matches(&self) -> bool {
        self.stored == self.computed
    }
}
