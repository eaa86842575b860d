// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Magic-anchored header search.

use crate::config::{RecoveryConfig, BLOCK_DATA, BLOCK_PHYS};
use crate::error::{RecoveryError, Result};
use crate::interleave::{decode, physical_span};
use crate::io::FlashRead;
use crate::layout::HeaderRecord;
use crate::report::LocatedHeader;

/// Physical bytes read per header candidate (102).
pub const HEADER_WINDOW: usize = physical_span(HeaderRecord::SIZE);

/// Sweep the configured end offsets; the first window whose decoded bytes
/// start with the header magic wins.
///
/// A candidate that cannot be read (or starts inside a metadata pair) is
/// skipped. Nothing matching yields [`RecoveryError::HeaderNotFound`].
pub fn locate_header<F: FlashRead + ?Sized>(flash: &F, config: &RecoveryConfig) -> Result<LocatedHeader> {
    let sweep = config.header_sweep;
    for end in sweep.candidates() {
        let Some(start) = end.checked_sub(HEADER_WINDOW as u32) else {
            tracing::warn!("Candidate end {:#x} precedes the header window", end);
            continue;
        };
        let phase = start as usize % BLOCK_PHYS;
        if phase >= BLOCK_DATA {
            tracing::warn!("Candidate @ {:#x} starts inside block metadata", start);
            continue;
        }

        let window = match flash.read_storage(start, HEADER_WINDOW) {
            Ok(w) => w,
            Err(RecoveryError::ShortRead { .. }) => {
                tracing::warn!("Couldn't read flash @ {:#x}-{}", end, HEADER_WINDOW);
                continue;
            }
            Err(e) => return Err(e),
        };
        let logical = decode(&window, phase, HeaderRecord::SIZE)?;
        if logical[..4] != config.header_magic {
            tracing::debug!("No header magic @ {:#x}-{}", end, HEADER_WINDOW);
            continue;
        }

        tracing::info!("Found RBL @ {:#x}-{}", end, HEADER_WINDOW);
        return Ok(LocatedHeader {
            header: HeaderRecord::from_slice(&logical)?,
            end_offset: end,
            physical_offset: start,
        });
    }

    Err(RecoveryError::HeaderNotFound {
        candidates: sweep.len(),
    })
}
