use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;

use bkflash_kernel::report::MarkerStatus;
use bkflash_kernel::{reconstruct, Outcome, ReconstructionReport, RecoveryConfig};
use bkflash_storage::{image, FlashDump, MemoryImage};

use super::{header_table, table};
use crate::hexdump;

pub struct RecoverOptions {
    pub flash: PathBuf,
    /// Logical memory capture of the resident bootloader. When absent the
    /// decoded flash stands in for live memory.
    pub memory: Option<PathBuf>,
    pub base: u32,
    pub output: Option<PathBuf>,
    pub size_ceiling: Option<u32>,
    pub attempts: Option<u32>,
    pub json: bool,
    pub dump: bool,
}

impl RecoverOptions {
    pub fn new(flash: impl Into<PathBuf>) -> Self {
        Self {
            flash: flash.into(),
            memory: None,
            base: 0,
            output: None,
            size_ceiling: None,
            attempts: None,
            json: false,
            dump: false,
        }
    }

    fn config(&self) -> RecoveryConfig {
        let defaults = RecoveryConfig::default();
        RecoveryConfig {
            live_base: self.base,
            fallback_dump_base: self.base,
            size_ceiling: self.size_ceiling.unwrap_or(defaults.size_ceiling),
            partition_attempts: self.attempts.unwrap_or(defaults.partition_attempts),
            ..defaults
        }
    }
}

#[derive(Serialize)]
struct JsonPartition {
    name: String,
    flash_name: String,
    offset: u32,
    length: u32,
    logical_address: u32,
    physical_bounds: Option<(u64, u64)>,
}

#[derive(Serialize)]
struct JsonReport {
    end_offset: u32,
    magic: String,
    ota_alg: u32,
    timestamp: u32,
    name: String,
    version: String,
    serial_number: String,
    crc: u32,
    hash: u32,
    size_raw: u32,
    size_packaged: u32,
    header_crc: u32,
    computed_header_crc: u32,
    checksum_mismatch: bool,
    marker_patched: bool,
    image_len: usize,
    partitions: Vec<JsonPartition>,
    findings: Vec<String>,
}

impl From<&ReconstructionReport> for JsonReport {
    fn from(r: &ReconstructionReport) -> Self {
        let h = &r.header.header;
        Self {
            end_offset: r.header.end_offset,
            magic: h.magic_str().into_owned(),
            ota_alg: h.ota_alg,
            timestamp: h.timestamp,
            name: h.name_str().into_owned(),
            version: h.version_str().into_owned(),
            serial_number: h.serial_number_str().into_owned(),
            crc: h.crc,
            hash: h.hash,
            size_raw: h.size_raw,
            size_packaged: h.size_packaged,
            header_crc: h.header_crc,
            computed_header_crc: r.checksum.computed,
            checksum_mismatch: r.checksum_mismatch(),
            marker_patched: r.marker.is_patched(),
            image_len: r.image.len(),
            partitions: r
                .partitions
                .iter()
                .map(|p| JsonPartition {
                    name: p.name(),
                    flash_name: p.flash_name(),
                    offset: p.offset(),
                    length: p.length(),
                    logical_address: p.logical_address,
                    physical_bounds: p.physical_bounds,
                })
                .collect(),
            findings: r.findings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Run the pipeline against files on disk and return its outcome.
pub fn execute(opts: &RecoverOptions) -> anyhow::Result<Outcome> {
    let config = opts.config();
    let flash = FlashDump::open(&opts.flash)
        .with_context(|| format!("Failed to open flash dump {:?}", opts.flash))?;
    let memory = match &opts.memory {
        Some(path) => MemoryImage::from_file(path, opts.base)
            .with_context(|| format!("Failed to read memory image {path:?}"))?,
        None => {
            let decoded = MemoryImage::decoded_from(&flash);
            MemoryImage::new(opts.base, decoded.bytes)
        }
    };

    let outcome = reconstruct(&config, &flash, &memory)?;
    if let (Outcome::Report(report), Some(output)) = (&outcome, &opts.output) {
        image::write_image(output, &report.image)
            .with_context(|| format!("Failed to write image {output:?}"))?;
    }
    Ok(outcome)
}

pub fn run(opts: &RecoverOptions) -> anyhow::Result<()> {
    match execute(opts)? {
        Outcome::Report(report) if opts.json => {
            println!("{}", serde_json::to_string_pretty(&JsonReport::from(&report))?);
        }
        Outcome::Report(report) => print_report(&report, &opts.config(), opts.dump),
        Outcome::Fallback(dump) => {
            println!(
                "\nNo RBL header in {} candidate offsets. Unprocessed memory @ {:#x}:\n",
                dump.candidates, dump.base
            );
            hexdump::print(&dump.bytes, dump.base, dump.bytes_per_line);
        }
    }
    Ok(())
}

/// Hex listing of the recovered image at its live memory address.
pub fn image_lines<'a>(
    report: &'a ReconstructionReport,
    config: &RecoveryConfig,
) -> impl Iterator<Item = String> + 'a {
    hexdump::lines(&report.image, config.live_base, config.dump_bytes_per_line)
}

fn print_report(report: &ReconstructionReport, config: &RecoveryConfig, dump: bool) {
    println!("\nRBL header @ {:#x}-102\n", report.header.end_offset);
    println!("{}\n", header_table(&report.header.header));

    if report.checksum_mismatch() {
        println!(
            "Header CRC check failed! Calculated: {:08x}, found: {:08x}\n",
            report.checksum.computed, report.checksum.stored
        );
    } else {
        println!("Header CRC OK!\n");
    }

    match &report.marker {
        MarkerStatus::Patched { physical_offset, .. } => {
            println!("BK7231 marker @ {physical_offset:#x}, copied");
        }
        MarkerStatus::NotFound { physical_offset, found } => {
            println!("BK7231 marker not found @ {physical_offset:#x} (read {})", hex::encode(found));
        }
    }

    let mut parts = table(vec!["Partition", "Flash", "Offset", "Length", "Physical bounds"]);
    for p in &report.partitions {
        let bounds = p
            .physical_bounds
            .map(|(o, l)| format!("{o:#08X}+{l:#X}"))
            .unwrap_or_default();
        parts.add_row(vec![
            p.name(),
            p.flash_name(),
            format!("{:#08X}", p.offset()),
            format!("{:#X}", p.length()),
            bounds,
        ]);
    }
    println!("\nFAL partitions\n");
    println!("{parts}\n");

    for finding in &report.findings {
        println!("WARNING: {finding}");
    }

    if dump {
        println!("\nBootloader data:");
        for line in image_lines(report, config) {
            println!("{line}");
        }
    }
    println!("Finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bkflash_kernel::fixtures::{sample_header, FlashBuilder};

    fn report_for(config: &RecoveryConfig) -> ReconstructionReport {
        let fixture = FlashBuilder::default()
            .header_at_end(0x11000, &sample_header(0x100))
            .build();
        let memory = MemoryImage::new(config.live_base, fixture.memory);
        match reconstruct(config, &fixture.flash, &memory).unwrap() {
            Outcome::Report(report) => report,
            Outcome::Fallback(_) => panic!("Expected report"),
        }
    }

    #[test]
    fn test_image_listing_uses_live_base_and_width() {
        let mut opts = RecoverOptions::new("flash.bin");
        opts.base = 0x1000;
        let config = RecoveryConfig {
            dump_bytes_per_line: 8,
            ..opts.config()
        };
        let report = report_for(&config);

        let lines: Vec<String> = image_lines(&report, &config).collect();
        assert_eq!(lines.len(), 0x100 / 8);
        assert!(lines[0].starts_with("00001000  "));
        assert!(lines[1].starts_with("00001008  "));
        assert_eq!(lines[0].split("  ").nth(1).map(|h| h.split(' ').count()), Some(8));
    }

    #[test]
    fn test_image_listing_defaults() {
        let config = RecoverOptions::new("flash.bin").config();
        let report = report_for(&config);

        let lines: Vec<String> = image_lines(&report, &config).collect();
        assert_eq!(lines.len(), 0x100 / 16);
        assert!(lines[0].starts_with("00000000  "));
    }
}
