// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::RecoveryConfig;
use crate::fixtures::{sample_partition, FlashBuilder};
use crate::interleave::physical_offset_of;
use crate::layout::PartitionRecord;
use crate::partition::{candidates, scan_partitions};

#[test]
fn test_candidates_step_back_one_record() {
    let addrs: Vec<u32> = candidates(0x8000, 10).collect();
    assert_eq!(addrs.len(), 10);
    assert_eq!(addrs[0], 0x8000 - 64);
    assert_eq!(addrs[9], 0x8000 - 640);
    assert!(addrs.windows(2).all(|w| w[0] - w[1] == 64));
}

#[test]
fn test_candidates_stop_at_zero() {
    let addrs: Vec<u32> = candidates(100, 10).collect();
    assert_eq!(addrs, vec![36]);
    assert_eq!(candidates(10, 10).count(), 0);
}

#[test]
fn test_scan_finds_record_at_end() {
    let size = 0x8000u32;
    let record = sample_partition("app", "beken_onchip", 0x11000, 0x6F000);
    let fixture = FlashBuilder::default().partition(size - 64, &record).build();

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "app");
    assert_eq!(found[0].offset(), 0x11000);
    assert_eq!(found[0].length(), 0x6F000);
    assert_eq!(found[0].logical_address, size - 64);
    assert_eq!(found[0].physical_offset, physical_offset_of(size - 64));
    assert_eq!(found[0].physical_bounds, None);
    assert_eq!(&image[size as usize - 64..], &record.to_bytes()[..]);
}

#[test]
fn test_scan_unaligned_image_end() {
    // Image size 16 bytes into a block: every candidate straddles a metadata pair.
    let size = 0x7F10u32;
    let record = sample_partition("download", "beken_onchip", 0x132000, 0xA6000);
    let fixture = FlashBuilder::default().partition(size - 64 * 3, &record).build();

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].record, record);
    assert_eq!(found[0].logical_address, size - 64 * 3);
}

#[test]
fn test_onchip_crc_partition_gets_physical_bounds() {
    let size = 0x8000u32;
    let boot = sample_partition("bootloader", "beken_onchip_crc", 0x0, 0x11000);
    let app = sample_partition("app", "beken_onchip_crc", 0x11000, 0x6F000);
    let fixture = FlashBuilder::default()
        .partition(size - 128, &boot)
        .partition(size - 64, &app)
        .build();

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);

    let names: Vec<String> = found.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["app", "bootloader"]);
    assert_eq!(found[0].physical_bounds, Some((0x12100, 0x75F00)));
    assert_eq!(found[1].physical_bounds, Some((0x0, 0x12100)));
    // bounds are display values only
    assert_eq!(found[0].record.offset, 0x11000);
}

#[test]
fn test_erased_length_bounds_do_not_overflow() {
    let size = 0x8000u32;
    let erased = sample_partition("app", "beken_onchip_crc", 0x11000, 0xFFFF_FFFF);
    let fixture = FlashBuilder::default().partition(size - 64, &erased).build();

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].physical_bounds, Some((0x12100, 0x1_0FFF_FFDE)));
    assert_eq!(
        sample_partition("a", "b", 0xFFFF_FFFF, 0).physical_bounds(),
        (0xFFFF_FFFFu64 / 32 * 34, 0)
    );
}

#[test]
fn test_tiny_image_scans_down_to_address_zero() {
    let size = 128u32;
    let record = sample_partition("bootloader", "beken_onchip", 0x0, 0x11000);
    let fixture = FlashBuilder::default().partition(0, &record).build();

    assert_eq!(candidates(size, 10).collect::<Vec<_>>(), vec![64, 0]);

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].logical_address, 0);
    assert_eq!(found[0].physical_offset, 0);
    assert_eq!(&image[..64], &record.to_bytes()[..]);
    assert!(image[64..].iter().all(|&b| b == 0));
}

#[test]
fn test_scan_window_is_bounded() {
    let size = 0x8000u32;
    let record = sample_partition("app", "beken_onchip", 0x11000, 0x6F000);
    let fixture = FlashBuilder::default()
        .partition(size - 64 * 11, &record)
        .build();

    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);
    assert!(found.is_empty());
    assert!(image.iter().all(|&b| b == 0));
}

#[test]
fn test_short_flash_is_not_fatal() {
    let size = 0x8000u32;
    let fixture = FlashBuilder::new(0x1000).build();
    let mut image = vec![0u8; size as usize];
    let found = scan_partitions(&fixture.flash, &RecoveryConfig::default(), &mut image);
    assert!(found.is_empty());
}

#[test]
fn test_record_layout() {
    let record = sample_partition("app", "beken_onchip_crc", 0x11000, 0x6F000);
    let bytes = record.to_bytes();
    assert_eq!(bytes.len(), PartitionRecord::SIZE);
    assert_eq!(&bytes[0..4], b"01PE");
    assert_eq!(&bytes[4..7], b"app");
    assert_eq!(&bytes[52..56], &0x11000u32.to_le_bytes());
    assert_eq!(PartitionRecord::parse(&bytes).flash_name_str(), "beken_onchip_crc");
}
