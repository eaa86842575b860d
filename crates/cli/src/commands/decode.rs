use anyhow::Context;
use std::path::Path;

use bkflash_storage::{image, FlashDump};

/// Strip the interleave from a whole dump. Returns the logical length.
pub fn run(flash_path: &Path, output: &Path) -> anyhow::Result<usize> {
    let flash = FlashDump::open(flash_path)
        .with_context(|| format!("Failed to open flash dump {flash_path:?}"))?;
    let logical = flash.decoded();
    image::write_image(output, &logical)
        .with_context(|| format!("Failed to write {output:?}"))?;

    println!(
        "Decoded {:#x} physical bytes into {:#x} logical bytes -> {}",
        flash.bytes().len(),
        logical.len(),
        output.display()
    );
    Ok(logical.len())
}
