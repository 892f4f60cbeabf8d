// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for machine descriptions.

/// Errors raised while describing or parsing machine resources.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MachineSpecError {
    /// A device or node count was zero.
    #[error("machine specification needs at least one {what}")]
    EmptyResource { what: &'static str },

    /// A bandwidth was negative or not a number.
    #[error("invalid {which} bandwidth: {value}")]
    InvalidBandwidth { which: &'static str, value: f64 },

    /// A memory budget string could not be parsed.
    #[error("invalid memory budget '{input}': {reason}")]
    InvalidBudget { input: String, reason: String },
}
