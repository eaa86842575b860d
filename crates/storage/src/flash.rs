use crate::error::{Result, StorageError};
use bkflash_kernel::interleave::decode_stream;
use bkflash_kernel::io::{slice_at, FlashRead};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Raw flash dump mapped read-only from disk.
pub struct FlashDump {
    map: Option<Mmap>,
}

impl FlashDump {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        if len > u32::MAX as u64 {
            return Err(StorageError::InvalidFormat(format!(
                "flash dump of {len} bytes exceeds the 32-bit address space"
            )));
        }
        // An empty file cannot be mapped on every platform.
        let map = if len == 0 { None } else { Some(unsafe { Mmap::map(&file)? }) };
        tracing::debug!("Mapped flash dump {:?} ({:#x} bytes)", path.as_ref(), len);
        Ok(Self { map })
    }

    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Logical content of the whole dump.
    pub fn decoded(&self) -> Vec<u8> {
        decode_stream(self.bytes())
    }
}

impl FlashRead for FlashDump {
    fn flash_size(&self) -> u64 {
        self.bytes().len() as u64
    }

    fn read_storage(&self, offset: u32, len: usize) -> bkflash_kernel::KernelResult<Vec<u8>> {
        slice_at(self.bytes(), offset, len).map(<[u8]>::to_vec)
    }
}
