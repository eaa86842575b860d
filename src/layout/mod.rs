// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Packed on-flash records.
//!
//! All records are little-endian and decoded field by field from byte
//! slices; text fields are NUL-padded.

pub mod header;
pub mod partition;

pub use header::HeaderRecord;
pub use partition::PartitionRecord;

use std::borrow::Cow;

/// Length of the hardware marker token.
pub const MARKER_LEN: usize = 8;

/// Text of a NUL-padded field, up to the first NUL.
pub fn text(field: &[u8]) -> Cow<'_, str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

/// NUL-pad `s` into a fixed field, truncating if it does not fit.
pub fn padded<const N: usize>(s: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let n = s.len().min(N);
    field[..n].copy_from_slice(&s.as_bytes()[..n]);
    field
}

pub(crate) fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    field.copy_from_slice(&bytes[..N]);
    field
}
