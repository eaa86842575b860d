use crate::error::Result;
use bkflash_kernel::fixtures::{sample_header, sample_partition, FlashBuilder, Fixture};

use std::fs;
use std::path::{Path, PathBuf};

pub struct TestPaths {
    pub flash: PathBuf,
    pub memory: PathBuf,
}

/// Raw size declared by the header in [`generate_recovery_scenario`].
pub const SCENARIO_SIZE: u32 = 0x8000;

fn write_fixture(dir: &Path, fixture: &Fixture) -> Result<TestPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let flash = dir.join("flash.bin");
    let memory = dir.join("memory.bin");
    fs::write(&flash, &fixture.flash)?;
    fs::write(&memory, &fixture.memory)?;
    Ok(TestPaths { flash, memory })
}

/// A healthy dump: header at the last candidate, marker present, and a
/// two-entry partition table at the end of the bootloader.
pub fn generate_recovery_scenario(dir: &Path) -> Result<TestPaths> {
    let size = SCENARIO_SIZE;
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(size))
        .flash_bytes(0x100, b"BK7231\0\0")
        .live(0x100, &[0u8; 8])
        .partition(size - 128, &sample_partition("bootloader", "beken_onchip_crc", 0x0, 0x11000))
        .partition(size - 64, &sample_partition("app", "beken_onchip_crc", 0x11000, 0x6F000))
        .build();
    write_fixture(dir, &fixture)
}

/// A dump with no header anywhere in the sweep.
pub fn generate_blank_scenario(dir: &Path) -> Result<TestPaths> {
    write_fixture(dir, &FlashBuilder::default().build())
}

/// A header declaring more than the size ceiling.
pub fn generate_oversized_scenario(dir: &Path) -> Result<TestPaths> {
    let fixture = FlashBuilder::default()
        .header_at_end(0x11000, &sample_header(0x20000))
        .build();
    write_fixture(dir, &fixture)
}
