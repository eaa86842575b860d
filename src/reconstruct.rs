// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bootloader reconstruction pipeline.
//!
//! `Start -> LocatingHeader -> HeaderFound -> ValidatingChecksum ->
//! Reconstructing -> ScanningPartitions -> Done`, or
//! `LocatingHeader -> HeaderNotFound -> FallbackRawDump -> Done`.
//! No stage is retried.

use crate::config::RecoveryConfig;
use crate::error::{RecoveryError, Result};
use crate::interleave::{decode, offset_in_block, physical_offset_of, required_physical_len};
use crate::io::{FlashRead, LiveMemory};
use crate::layout::{HeaderRecord, MARKER_LEN};
use crate::locate::locate_header;
use crate::partition::scan_partitions;
use crate::report::{FallbackDump, Finding, LocatedHeader, MarkerStatus, ReconstructionReport, Stage};

/// Terminal result of a run that did not hit a fatal condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Report(ReconstructionReport),
    Fallback(FallbackDump),
}

pub struct Reconstructor<'a, F: ?Sized, M: ?Sized> {
    config: &'a RecoveryConfig,
    flash: &'a F,
    memory: &'a M,
}

impl<'a, F, M> Reconstructor<'a, F, M>
where
    F: FlashRead + ?Sized,
    M: LiveMemory + ?Sized,
{
    pub fn new(config: &'a RecoveryConfig, flash: &'a F, memory: &'a M) -> Self {
        Self { config, flash, memory }
    }

    pub fn run(&self) -> Result<Outcome> {
        let mut trail = vec![Stage::Start];
        enter(&mut trail, Stage::LocatingHeader);

        let located = match locate_header(self.flash, self.config) {
            Ok(located) => located,
            Err(RecoveryError::HeaderNotFound { candidates }) => {
                enter(&mut trail, Stage::HeaderNotFound);
                tracing::error!("Couldn't find or read RBL. Dumping unprocessed bootloader...");
                enter(&mut trail, Stage::FallbackRawDump);
                let mut dump = self.fallback_dump(candidates)?;
                enter(&mut trail, Stage::Done);
                dump.trail = trail;
                return Ok(Outcome::Fallback(dump));
            }
            Err(e) => return Err(e),
        };
        enter(&mut trail, Stage::HeaderFound);
        log_header(&located.header);

        enter(&mut trail, Stage::ValidatingChecksum);
        let mut findings = Vec::new();
        let checksum = located.header.checksum_status();
        if checksum.matches() {
            tracing::info!("Header CRC OK!");
        } else {
            tracing::warn!(
                "Header CRC check failed! Calculated: {:08x}, found: {:08x}",
                checksum.computed,
                checksum.stored
            );
            findings.push(Finding::ChecksumMismatch {
                stored: checksum.stored,
                computed: checksum.computed,
            });
        }

        enter(&mut trail, Stage::Reconstructing);
        let mut image = self.copy_image(&located)?;
        let marker = self.patch_marker(&mut image);
        if let MarkerStatus::NotFound { physical_offset, .. } = marker {
            findings.push(Finding::MarkerNotFound { physical_offset });
        }

        enter(&mut trail, Stage::ScanningPartitions);
        let partitions = scan_partitions(self.flash, self.config, &mut image);
        if partitions.is_empty() {
            tracing::warn!("No FAL partition records found");
            findings.push(Finding::PartitionNotFound {
                attempts: self.config.partition_attempts,
            });
        }

        enter(&mut trail, Stage::Done);
        Ok(Outcome::Report(ReconstructionReport {
            header: located,
            checksum,
            image,
            marker,
            partitions,
            findings,
            trail,
        }))
    }

    /// Allocate `size_raw` zeroed bytes and fill them from live memory.
    fn copy_image(&self, located: &LocatedHeader) -> Result<Vec<u8>> {
        let size = located.header.size_raw;
        if size > self.config.size_ceiling {
            tracing::error!("RBL raw size too large!");
            return Err(RecoveryError::SizeTooLarge {
                size,
                ceiling: self.config.size_ceiling,
            });
        }

        let len = size as usize;
        let mut image = Vec::new();
        if image.try_reserve_exact(len).is_err() {
            tracing::error!("Allocation of {:#x} bytes failed!", len);
            return Err(RecoveryError::AllocationFailure { size: len });
        }
        image.resize(len, 0u8);

        tracing::info!("Copying bootloader from memory...");
        if let Err(e) = self.memory.read_live_memory(self.config.live_base, &mut image) {
            tracing::error!("Reading live memory failed: {}", e);
            return Err(e);
        }
        Ok(image)
    }

    /// Overwrite the marker slot with the marker read from flash, if it
    /// matches the expected token.
    fn patch_marker(&self, image: &mut [u8]) -> MarkerStatus {
        let logical = self.config.marker_logical_offset;
        let physical = physical_offset_of(logical);
        let start_in_block = offset_in_block(logical);
        let window_len = required_physical_len(start_in_block, MARKER_LEN);

        let found = self
            .flash
            .read_storage(physical, window_len)
            .and_then(|window| decode(&window, start_in_block, MARKER_LEN))
            .unwrap_or_default();

        let start = logical as usize;
        let fits = start + MARKER_LEN <= image.len();
        if found != self.config.marker || !fits {
            tracing::warn!(" - BK7231 marker not found @ {:#x}", physical);
            return MarkerStatus::NotFound {
                physical_offset: physical,
                found,
            };
        }

        tracing::info!(" - BK7231 marker @ {:#x}, copying", physical);
        image[start..start + MARKER_LEN].copy_from_slice(&found);
        MarkerStatus::Patched {
            physical_offset: physical,
            logical_offset: logical,
        }
    }

    /// Capture the fixed fallback range, truncated to what memory holds.
    fn fallback_dump(&self, candidates: usize) -> Result<FallbackDump> {
        let base = self.config.fallback_dump_base;
        let mut bytes = vec![0u8; self.config.fallback_dump_len as usize];
        match self.memory.read_live_memory(base, &mut bytes) {
            Ok(()) => {}
            Err(RecoveryError::ShortRead { have: 0, .. }) => {
                tracing::warn!("Dump base {:#x} is outside live memory", base);
                bytes.clear();
            }
            Err(RecoveryError::ShortRead { have, .. }) => {
                tracing::warn!("Live memory holds only {:#x} bytes of the dump range", have);
                bytes.truncate(have);
                self.memory.read_live_memory(base, &mut bytes)?;
            }
            Err(e) => return Err(e),
        }
        Ok(FallbackDump {
            base,
            bytes,
            bytes_per_line: self.config.dump_bytes_per_line,
            candidates,
            trail: Vec::new(),
        })
    }
}

/// Run the whole pipeline once.
pub fn reconstruct<F, M>(config: &RecoveryConfig, flash: &F, memory: &M) -> Result<Outcome>
where
    F: FlashRead + ?Sized,
    M: LiveMemory + ?Sized,
{
    Reconstructor::new(config, flash, memory).run()
}

fn enter(trail: &mut Vec<Stage>, stage: Stage) {
    tracing::debug!(%stage, "entering stage");
    trail.push(stage);
}

fn log_header(header: &HeaderRecord) {
    tracing::info!("RBL Header:");
    tracing::info!(" - magic='{}'", header.magic_str());
    tracing::info!(" - ota_alg={:08x}", header.ota_alg);
    tracing::info!(" - timestamp={}", header.timestamp);
    tracing::info!(" - name='{}'", header.name_str());
    tracing::info!(" - version='{}'", header.version_str());
    tracing::info!(" - serial_number='{}'", header.serial_number_str());
    tracing::info!(" - crc={:08x}", header.crc);
    tracing::info!(" - hash={:08x}", header.hash);
    tracing::info!(" - size_raw={}", header.size_raw);
    tracing::info!(" - size_packaged={}", header.size_packaged);
    tracing::info!(" - header_crc={:08x}", header.header_crc);
}
