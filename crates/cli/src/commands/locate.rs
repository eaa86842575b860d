use anyhow::Context;
use std::path::Path;

use bkflash_kernel::locate::locate_header;
use bkflash_kernel::RecoveryConfig;
use bkflash_storage::FlashDump;

use super::header_table;

pub fn run(flash_path: &Path) -> anyhow::Result<()> {
    let flash = FlashDump::open(flash_path)
        .with_context(|| format!("Failed to open flash dump {flash_path:?}"))?;
    let located = locate_header(&flash, &RecoveryConfig::default())?;
    let status = located.header.checksum_status();

    println!("\nRBL header @ {:#x}-102 (physical {:#x})\n", located.end_offset, located.physical_offset);
    println!("{}\n", header_table(&located.header));
    if status.matches() {
        println!("Header CRC OK ({:08x})\n", status.computed);
    } else {
        println!("Header CRC MISMATCH: calculated {:08x}, found {:08x}\n", status.computed, status.stored);
    }
    Ok(())
}
