use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

use crate::hexdump;

pub fn run(path: &Path, offset: u32, length: Option<u32>, width: usize) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
    let start = offset as usize;
    if start > bytes.len() {
        bail!("offset {offset:#x} is past the end of {path:?} ({:#x} bytes)", bytes.len());
    }
    let end = match length {
        Some(len) => (start + len as usize).min(bytes.len()),
        None => bytes.len(),
    };
    hexdump::print(&bytes[start..end], offset, width);
    Ok(())
}
