// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::RecoveryConfig;
use crate::error::RecoveryError;
use crate::fixtures::{sample_header, sample_partition, FlashBuilder};
use crate::layout::HeaderRecord;
use crate::reconstruct::{reconstruct, Outcome};
use crate::report::{Finding, MarkerStatus, ReconstructionReport, Stage};

const MARKER: &[u8; 8] = b"BK7231\0\0";

fn expect_report(outcome: Outcome) -> ReconstructionReport {
    match outcome {
        Outcome::Report(report) => report,
        Outcome::Fallback(dump) => panic!("Expected report, got fallback of {} bytes", dump.bytes.len()),
    }
}

#[test]
fn test_valid_header_at_last_candidate() {
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(0x8000))
        .build();

    let report = expect_report(reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap());

    assert!(!report.checksum_mismatch());
    assert_eq!(report.image.len(), 0x8000);
    assert_eq!(report.header.end_offset, 0x11000);
    assert!(!report.findings.iter().any(|f| matches!(f, Finding::ChecksumMismatch { .. })));
    assert_eq!(
        report.trail,
        vec![
            Stage::Start,
            Stage::LocatingHeader,
            Stage::HeaderFound,
            Stage::ValidatingChecksum,
            Stage::Reconstructing,
            Stage::ScanningPartitions,
            Stage::Done,
        ]
    );
}

#[test]
fn test_missing_header_falls_back_to_dump() {
    let fixture = FlashBuilder::default().build();
    let config = RecoveryConfig::default();

    match reconstruct(&config, &fixture.flash, &fixture.memory).unwrap() {
        Outcome::Fallback(dump) => {
            assert_eq!(dump.base, 0);
            assert_eq!(dump.bytes.len(), 0xFFFF);
            assert_eq!(&dump.bytes[..], &fixture.memory[..0xFFFF]);
            assert_eq!(dump.bytes_per_line, 16);
            assert_eq!(dump.candidates, 3);
            assert_eq!(
                dump.trail,
                vec![
                    Stage::Start,
                    Stage::LocatingHeader,
                    Stage::HeaderNotFound,
                    Stage::FallbackRawDump,
                    Stage::Done,
                ]
            );
        }
        Outcome::Report(_) => panic!("Expected fallback dump"),
    }
}

#[test]
fn test_fallback_dump_truncated_to_memory() {
    let fixture = FlashBuilder::new(0x800).build();
    match reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap() {
        Outcome::Fallback(dump) => assert_eq!(dump.bytes.len(), 0x800),
        Outcome::Report(_) => panic!("Expected fallback dump"),
    }
}

#[test]
fn test_fallback_base_beyond_memory_yields_empty_dump() {
    let fixture = FlashBuilder::new(0x800).build();
    let config = RecoveryConfig {
        fallback_dump_base: 0x1000,
        ..RecoveryConfig::default()
    };

    match reconstruct(&config, &fixture.flash, &fixture.memory).unwrap() {
        Outcome::Fallback(dump) => {
            assert_eq!(dump.base, 0x1000);
            assert!(dump.bytes.is_empty());
        }
        Outcome::Report(_) => panic!("Expected fallback dump"),
    }
}

#[test]
fn test_partition_record_reported() {
    let size = 0x8000u32;
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(size))
        .partition(size - 64, &sample_partition("app", "beken_onchip", 0x11000, 0x6F000))
        .build();

    let report = expect_report(reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap());

    assert_eq!(report.partitions.len(), 1);
    let part = &report.partitions[0];
    assert_eq!(&part.record.magic, b"01PE");
    assert_eq!(part.name(), "app");
    assert_eq!(part.flash_name(), "beken_onchip");
    assert_eq!(part.offset(), 0x11000);
    assert_eq!(part.length(), 0x6F000);
    assert_eq!(&report.image[size as usize - 64..size as usize - 60], b"01PE");
    assert_eq!(report.findings, vec![Finding::MarkerNotFound { physical_offset: 0x110 }]);
}

#[test]
fn test_marker_mismatch_is_not_fatal() {
    let live_slot = [0x11u8; 8];
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(0x8000))
        .flash_bytes(0x100, b"BK7232\0\0")
        .live(0x100, &live_slot)
        .build();

    let report = expect_report(reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap());

    assert!(!report.marker.is_patched());
    assert!(report.findings.contains(&Finding::MarkerNotFound { physical_offset: 0x110 }));
    assert_eq!(&report.image[0x100..0x108], &live_slot);
}

#[test]
fn test_marker_patched_over_live_copy() {
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(0x8000))
        .flash_bytes(0x100, MARKER)
        .live(0x100, &[0u8; 8])
        .build();

    let report = expect_report(reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap());

    assert_eq!(
        report.marker,
        MarkerStatus::Patched { physical_offset: 0x110, logical_offset: 0x100 }
    );
    assert_eq!(&report.image[0x100..0x108], MARKER);
}

#[test]
fn test_checksum_mismatch_continues() {
    let mut header = sample_header(0x4000);
    header.header_crc ^= 0xFFFF_FFFF;
    let fixture = FlashBuilder::default().header_at_end(0xEE00, &header).build();

    let report = expect_report(reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory).unwrap());

    assert!(report.checksum_mismatch());
    assert_eq!(report.image.len(), 0x4000);
    assert!(report.findings.contains(&Finding::ChecksumMismatch {
        stored: header.header_crc,
        computed: header.checksum_status().computed,
    }));
    assert!(report.findings.contains(&Finding::PartitionNotFound { attempts: 10 }));
}

#[test]
fn test_oversized_header_is_fatal() {
    let header: HeaderRecord = sample_header(0x10001);
    let fixture = FlashBuilder::default().header_at_end(0x11000, &header).build();

    let res = reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory);
    assert_eq!(
        res.unwrap_err(),
        RecoveryError::SizeTooLarge { size: 0x10001, ceiling: 0x10000 }
    );
}

#[test]
fn test_huge_declared_size_never_allocates() {
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(u32::MAX))
        .build();
    let res = reconstruct(&RecoveryConfig::default(), &fixture.flash, &fixture.memory);
    assert!(matches!(res, Err(RecoveryError::SizeTooLarge { size: u32::MAX, .. })));
}

#[test]
fn test_short_live_memory_is_fatal() {
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(0x8000))
        .build();
    let memory = fixture.memory[..0x1000].to_vec();

    let res = reconstruct(&RecoveryConfig::default(), &fixture.flash, &memory);
    assert!(matches!(res, Err(RecoveryError::ShortRead { need: 0x8000, have: 0x1000, .. })));
}
