use crate::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a recovered logical image to `path`, replacing any existing file.
pub fn write_image(path: impl AsRef<Path>, image: &[u8]) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    file.write_all(image)?;
    file.sync_data()?;
    tracing::info!("Wrote {:#x} bytes to {:?}", image.len(), path.as_ref());
    Ok(())
}
