use crate::error::Result;
use crate::flash::FlashDump;
use bkflash_kernel::io::{slice_at, LiveMemory};
use bkflash_kernel::{KernelResult, RecoveryError};
use std::fs;
use std::path::Path;

/// Live memory region: `bytes` resident at address `base`.
pub struct MemoryImage {
    pub base: u32,
    pub bytes: Vec<u8>,
}

impl MemoryImage {
    pub fn new(base: u32, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    /// A logical memory image captured to a file, loaded at `base`.
    pub fn from_file(path: impl AsRef<Path>, base: u32) -> Result<Self> {
        Ok(Self::new(base, fs::read(path)?))
    }

    /// Memory as the running device sees flash: the interleave stripped,
    /// mapped at address 0.
    pub fn decoded_from(flash: &FlashDump) -> Self {
        Self::new(0, flash.decoded())
    }
}

impl LiveMemory for MemoryImage {
    fn read_live_memory(&self, address: u32, dst: &mut [u8]) -> KernelResult<()> {
        let Some(offset) = address.checked_sub(self.base) else {
            return Err(RecoveryError::ShortRead {
                offset: address,
                need: dst.len(),
                have: 0,
            });
        };
        let src = slice_at(&self.bytes, offset, dst.len()).map_err(|e| match e {
            RecoveryError::ShortRead { need, have, .. } => RecoveryError::ShortRead {
                offset: address,
                need,
                have,
            },
            other => other,
        })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_translation() {
        let mem = MemoryImage::new(0x1000, vec![1, 2, 3, 4]);
        let mut buf = [0u8; 2];
        mem.read_live_memory(0x1002, &mut buf).unwrap();
        assert_eq!(buf, [3, 4]);

        assert!(matches!(
            mem.read_live_memory(0x0, &mut buf),
            Err(RecoveryError::ShortRead { offset: 0, have: 0, .. })
        ));
        assert!(matches!(
            mem.read_live_memory(0x1003, &mut buf),
            Err(RecoveryError::ShortRead { offset: 0x1003, need: 2, have: 1 })
        ));
    }
}
