// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! bkflash-kernel: recovery of a BK72xx bootloader image and its partition
//! table from a raw flash dump in the 32:2 interleaved encoding.

pub mod config;
pub mod error;
pub mod interleave;
pub mod checksum;
pub mod layout;
pub mod io;
pub mod locate;
pub mod partition;
pub mod reconstruct;
pub mod report;
pub mod fixtures;

pub use config::RecoveryConfig;
pub use error::{KernelResult, RecoveryError};
pub use reconstruct::{reconstruct, Outcome, Reconstructor};
pub use report::{FallbackDump, Finding, ReconstructionReport};

#[cfg(test)]
mod tests;
