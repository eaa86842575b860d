// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

/// Fatal conditions of the reconstruction pipeline.
///
/// Recoverable outcomes (damaged header CRC, missing marker, empty
/// partition table) are never returned as errors; see [`crate::report::Finding`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    /// No candidate offset of the header sweep carried the header magic.
    #[error("header magic not found in {candidates} candidate offsets")]
    HeaderNotFound { candidates: usize },
    /// The header declares a payload larger than the sanity ceiling.
    #[error("declared raw size {size:#x} exceeds ceiling {ceiling:#x}")]
    SizeTooLarge { size: u32, ceiling: u32 },
    /// The image buffer could not be reserved.
    #[error("failed to allocate {size:#x} bytes for the image")]
    AllocationFailure { size: usize },
    /// A collaborator or buffer yielded fewer bytes than requested.
    #[error("short read at {offset:#x}: need {need} bytes, have {have}")]
    ShortRead { offset: u32, need: usize, have: usize },
    /// A configuration value cannot describe a valid layout.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

pub type KernelResult<T> = core::result::Result<T, RecoveryError>;
pub type Result<T> = KernelResult<T>;
