// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Pipeline results.

use core::fmt;

use crate::checksum::ChecksumStatus;
use crate::layout::{HeaderRecord, PartitionRecord};

/// Stages of one reconstruction run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    LocatingHeader,
    HeaderFound,
    ValidatingChecksum,
    Reconstructing,
    ScanningPartitions,
    HeaderNotFound,
    FallbackRawDump,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::LocatingHeader => "locating-header",
            Stage::HeaderFound => "header-found",
            Stage::ValidatingChecksum => "validating-checksum",
            Stage::Reconstructing => "reconstructing",
            Stage::ScanningPartitions => "scanning-partitions",
            Stage::HeaderNotFound => "header-not-found",
            Stage::FallbackRawDump => "fallback-raw-dump",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Recoverable conditions noted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    ChecksumMismatch { stored: u32, computed: u32 },
    MarkerNotFound { physical_offset: u32 },
    PartitionNotFound { attempts: u32 },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ChecksumMismatch { stored, computed } => write!(
                f,
                "header CRC mismatch (calculated {computed:08x}, found {stored:08x})"
            ),
            Finding::MarkerNotFound { physical_offset } => {
                write!(f, "hardware marker not found @ {physical_offset:#x}")
            }
            Finding::PartitionNotFound { attempts } => {
                write!(f, "no partition record in {attempts} candidate positions")
            }
        }
    }
}

/// Header record together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedHeader {
    pub header: HeaderRecord,
    /// Candidate end offset whose window held the magic.
    pub end_offset: u32,
    /// Physical offset the window was read from.
    pub physical_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerStatus {
    Patched { physical_offset: u32, logical_offset: u32 },
    NotFound { physical_offset: u32, found: Vec<u8> },
}

impl MarkerStatus {
    pub fn is_patched(&self) -> bool {
        matches!(self, MarkerStatus::Patched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPartition {
    pub record: PartitionRecord,
    /// Logical address inside the image where the record was patched.
    pub logical_address: u32,
    pub physical_offset: u32,
    /// Offset and length in interleaved units, for on-chip CRC partitions.
    pub physical_bounds: Option<(u64, u64)>,
}

impl DiscoveredPartition {
    pub fn name(&self) -> String {
        self.record.part_name_str().into_owned()
    }

    pub fn flash_name(&self) -> String {
        self.record.flash_name_str().into_owned()
    }

    pub fn offset(&self) -> u32 {
        self.record.offset
    }

    pub fn length(&self) -> u32 {
        self.record.length
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionReport {
    pub header: LocatedHeader,
    pub checksum: ChecksumStatus,
    /// Reconstructed logical bootloader, exactly `size_raw` bytes.
    pub image: Vec<u8>,
    pub marker: MarkerStatus,
    /// Records in discovery order (descending logical address).
    pub partitions: Vec<DiscoveredPartition>,
    pub findings: Vec<Finding>,
    pub trail: Vec<Stage>,
}

impl ReconstructionReport {
    pub fn checksum_mismatch(&self) -> bool {
        !self.checksum.matches()
    }
}

/// Raw memory captured when no header could be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDump {
    pub base: u32,
    pub bytes: Vec<u8>,
    pub bytes_per_line: usize,
    /// Number of header candidates that were tried.
    pub candidates: usize,
    pub trail: Vec<Stage>,
}
