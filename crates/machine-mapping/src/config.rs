// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mapper configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! device_type = "gpu"
//! memory_budget = "16G"
//!
//! [machine]
//! num_nodes = 2
//! num_cpus_per_node = 8
//! num_gpus_per_node = 4
//! inter_node_bandwidth = 25.0
//! intra_node_bandwidth = 300.0
//!
//! [optimizer]
//! type = "sgd"
//! lr = 0.01
//! momentum = 0.9
//! nesterov = false
//! weight_decay = 0.0
//! ```

use crate::{MappingError, TaskSpaceViews};
use machine_spec::{DeviceType, MachineSpecification, MemoryBudget};
use problem_tree::OptimizerAttrs;
use std::path::Path;

/// Configuration for a mapping run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapperConfig {
    /// Device type every operator is placed on.
    #[serde(default = "default_device_type")]
    pub device_type: DeviceType,
    /// Per-mapping memory budget (human-readable, e.g., `"16G"`). Unlimited when absent.
    #[serde(default)]
    pub memory_budget: Option<String>,
    /// Machine to map onto.
    pub machine: MachineSpecification,
    /// Optimizer attached to every operator cost query.
    #[serde(default)]
    pub optimizer: OptimizerAttrs,
}

fn default_device_type() -> DeviceType {
    DeviceType::Gpu
}

impl MapperConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MappingError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MappingError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, MappingError> {
        toml::from_str(toml_str)
            .map_err(|e| MappingError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, MappingError> {
        toml::to_string_pretty(self)
            .map_err(|e| MappingError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the memory budget, if one is set.
    pub fn parse_budget(&self) -> Result<Option<MemoryBudget>, MappingError> {
        self.memory_budget
            .as_deref()
            .map(|s| {
                MemoryBudget::parse(s)
                    .map_err(|e| MappingError::ConfigError(format!("invalid budget: {e}")))
            })
            .transpose()
    }

    /// The configured machine, after validation.
    pub fn machine_spec(&self) -> Result<MachineSpecification, MappingError> {
        self.machine.validate()?;
        Ok(self.machine.clone())
    }

    /// The allowed-views function for the configured device type.
    pub fn allowed_views(&self) -> TaskSpaceViews {
        TaskSpaceViews::new(self.device_type)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Gpu,
            memory_budget: None,
            machine: MachineSpecification::new(1, 1, 4, 25.0, 300.0),
            optimizer: OptimizerAttrs::default(),
        }
    }
}
