// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory budget configuration and parsing.
//!
//! A [`MemoryBudget`] is a ceiling on the memory a mapping may use. It is
//! applied after the search, to pick a point off the runtime/memory frontier.

use crate::MachineSpecError;
use std::fmt;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// A memory ceiling for a machine mapping.
///
/// # Parsing
/// Supports human-readable strings with binary suffixes:
/// - `"512M"` or `"512MB"` → 512 × 1024² bytes
/// - `"16G"` or `"16GB"` → 16 × 1024³ bytes
/// - `"2048K"` or `"2048KB"` → 2048 × 1024 bytes
/// - `"1073741824"` or `"100B"` → raw byte count
///
/// # Examples
/// ```
/// use machine_spec::MemoryBudget;
///
/// let b = MemoryBudget::parse("1G").unwrap();
/// assert_eq!(b.as_mb(), 1024);
/// assert!(b.admits(1024 * 1024));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MemoryBudget {
    bytes: u64,
}

impl MemoryBudget {
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn from_mb(mb: u64) -> Self {
        Self { bytes: mb * MB }
    }

    pub fn from_gb(gb: u64) -> Self {
        Self { bytes: gb * GB }
    }

    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns the budget in megabytes (truncated).
    pub fn as_mb(&self) -> u64 {
        self.bytes / MB
    }

    /// Returns `true` if `bytes` fits within the budget.
    pub fn admits(&self, bytes: u64) -> bool {
        bytes <= self.bytes
    }

    /// Parses a human-readable budget string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MachineSpecError> {
        let invalid = |reason: &str| MachineSpecError::InvalidBudget {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty string"));
        }

        let upper = trimmed.to_uppercase();
        let (num_str, multiplier) = [
            ("GB", GB),
            ("G", GB),
            ("MB", MB),
            ("M", MB),
            ("KB", KB),
            ("K", KB),
            ("B", 1),
        ]
        .iter()
        .find(|(suffix, _)| upper.ends_with(*suffix))
        .map(|&(suffix, mult)| (&upper[..upper.len() - suffix.len()], mult))
        .unwrap_or((upper.as_str(), 1));

        let value: u64 = num_str
            .trim()
            .parse()
            .map_err(|_| invalid("expected a number followed by an optional suffix (K, M, G)"))?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| invalid("overflow"))?;
        if bytes == 0 {
            return Err(invalid("budget must be non-zero"));
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{} GB", self.bytes / GB)
        } else if self.bytes >= MB && self.bytes % MB == 0 {
            write!(f, "{} MB", self.bytes / MB)
        } else if self.bytes >= KB && self.bytes % KB == 0 {
            write!(f, "{} KB", self.bytes / KB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
