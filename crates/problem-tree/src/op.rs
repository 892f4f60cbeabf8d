// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator descriptions and cost-estimate keys.
//!
//! A leaf of a problem tree holds an [`UnmappedOpCostEstimateKey`]: what the
//! operator is and the shapes it consumes and produces, but not where it
//! runs. Once a [`MachineView`] is chosen and optimizer settings are known
//! the key becomes an [`OpCostEstimateKey`] that a cost estimator can price.
//!
//! Operator attributes are kept opaque: the planner only needs them to be
//! comparable and hashable.

use machine_spec::{MachineView, OperatorTaskSpace};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::fmt;
use tensor_core::ParallelTensorShape;

/// The kind of computation an operator performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    Input,
    Weight,
    Linear,
    Conv2d,
    BatchMatmul,
    EwAdd,
    EwMul,
    Relu,
    Softmax,
    LayerNorm,
    Embedding,
    MultiHeadAttention,
    Concat,
    Split,
    Repartition,
    Combine,
    Replicate,
    Reduction,
}

impl OperatorType {
    /// Parses an operator type, accepting a few common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "input" => Some(Self::Input),
            "weight" | "param" => Some(Self::Weight),
            "linear" | "dense" | "fc" => Some(Self::Linear),
            "conv2d" | "conv_2d" => Some(Self::Conv2d),
            "batch_matmul" | "bmm" | "matmul" => Some(Self::BatchMatmul),
            "ew_add" | "add" => Some(Self::EwAdd),
            "ew_mul" | "mul" => Some(Self::EwMul),
            "relu" => Some(Self::Relu),
            "softmax" => Some(Self::Softmax),
            "layer_norm" | "layernorm" | "ln" => Some(Self::LayerNorm),
            "embedding" | "embed" => Some(Self::Embedding),
            "multi_head_attention" | "attention" | "mha" => Some(Self::MultiHeadAttention),
            "concat" => Some(Self::Concat),
            "split" => Some(Self::Split),
            "repartition" => Some(Self::Repartition),
            "combine" => Some(Self::Combine),
            "replicate" => Some(Self::Replicate),
            "reduction" | "reduce" => Some(Self::Reduction),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Weight => "weight",
            Self::Linear => "linear",
            Self::Conv2d => "conv2d",
            Self::BatchMatmul => "batch_matmul",
            Self::EwAdd => "ew_add",
            Self::EwMul => "ew_mul",
            Self::Relu => "relu",
            Self::Softmax => "softmax",
            Self::LayerNorm => "layer_norm",
            Self::Embedding => "embedding",
            Self::MultiHeadAttention => "multi_head_attention",
            Self::Concat => "concat",
            Self::Split => "split",
            Self::Repartition => "repartition",
            Self::Combine => "combine",
            Self::Replicate => "replicate",
            Self::Reduction => "reduction",
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator type plus its integer attributes (kernel size, axis, ...).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct OperatorAttrs {
    pub op_type: OperatorType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, i64>,
}

impl OperatorAttrs {
    pub fn new(op_type: OperatorType) -> Self {
        Self {
            op_type,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: i64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

impl fmt::Display for OperatorAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_type)?;
        if !self.attributes.is_empty() {
            let attrs: Vec<String> = self
                .attributes
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "({})", attrs.join(", "))?;
        }
        Ok(())
    }
}

/// Optimizer settings that influence the backward pass cost of an operator.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerAttrs {
    Sgd {
        lr: OrderedFloat<f64>,
        #[serde(default)]
        momentum: OrderedFloat<f64>,
        #[serde(default)]
        nesterov: bool,
        #[serde(default)]
        weight_decay: OrderedFloat<f64>,
    },
    Adam {
        alpha: OrderedFloat<f64>,
        beta1: OrderedFloat<f64>,
        beta2: OrderedFloat<f64>,
        #[serde(default)]
        weight_decay: OrderedFloat<f64>,
        epsilon: OrderedFloat<f64>,
    },
}

impl OptimizerAttrs {
    pub fn sgd(lr: f64, momentum: f64, nesterov: bool, weight_decay: f64) -> Self {
        Self::Sgd {
            lr: OrderedFloat(lr),
            momentum: OrderedFloat(momentum),
            nesterov,
            weight_decay: OrderedFloat(weight_decay),
        }
    }

    pub fn adam(alpha: f64, beta1: f64, beta2: f64, weight_decay: f64, epsilon: f64) -> Self {
        Self::Adam {
            alpha: OrderedFloat(alpha),
            beta1: OrderedFloat(beta1),
            beta2: OrderedFloat(beta2),
            weight_decay: OrderedFloat(weight_decay),
            epsilon: OrderedFloat(epsilon),
        }
    }
}

impl Default for OptimizerAttrs {
    fn default() -> Self {
        Self::sgd(0.01, 0.0, false, 0.0)
    }
}

/// An operator leaf before a device placement has been chosen.
///
/// This is the runtime-only form: optimizer settings are supplied by the
/// search context when the key is mapped.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct UnmappedOpCostEstimateKey {
    pub op_attrs: OperatorAttrs,
    #[serde(default)]
    pub input_shapes: Vec<ParallelTensorShape>,
    #[serde(default)]
    pub weight_shapes: Vec<ParallelTensorShape>,
    #[serde(default)]
    pub output_shapes: Vec<ParallelTensorShape>,
}

impl UnmappedOpCostEstimateKey {
    /// A key with no tensors, for operators whose cost is looked up by type.
    pub fn new(op_attrs: OperatorAttrs) -> Self {
        Self {
            op_attrs,
            input_shapes: Vec::new(),
            weight_shapes: Vec::new(),
            output_shapes: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, shapes: Vec<ParallelTensorShape>) -> Self {
        self.input_shapes = shapes;
        self
    }

    pub fn with_weights(mut self, shapes: Vec<ParallelTensorShape>) -> Self {
        self.weight_shapes = shapes;
        self
    }

    pub fn with_outputs(mut self, shapes: Vec<ParallelTensorShape>) -> Self {
        self.output_shapes = shapes;
        self
    }

    /// The parallel degrees the operator runs with.
    ///
    /// Taken from the first output: every shard degree, then the sum and
    /// discard-copy degrees, keeping only those greater than one. An operator
    /// with no outputs has an empty task space.
    pub fn operator_task_space(&self) -> OperatorTaskSpace {
        let degrees = match self.output_shapes.first() {
            Some(out) => out
                .shard_degrees()
                .into_iter()
                .chain([out.sum_degree, out.discard_copy_degree])
                .filter(|&d| d > 1)
                .collect(),
            None => Vec::new(),
        };
        OperatorTaskSpace::new(degrees)
    }

    /// Iterates over every tensor shape the operator touches.
    pub fn all_shapes(&self) -> impl Iterator<Item = &ParallelTensorShape> {
        self.input_shapes
            .iter()
            .chain(&self.weight_shapes)
            .chain(&self.output_shapes)
    }

    /// Fully qualifies the key with optimizer settings and a placement.
    pub fn with_placement(
        &self,
        optimizer_attrs: &OptimizerAttrs,
        machine_view: MachineView,
    ) -> OpCostEstimateKey {
        OpCostEstimateKey {
            op_attrs: self.op_attrs.clone(),
            input_shapes: self.input_shapes.clone(),
            weight_shapes: self.weight_shapes.clone(),
            output_shapes: self.output_shapes.clone(),
            optimizer_attrs: optimizer_attrs.clone(),
            machine_view,
        }
    }
}

impl fmt::Display for UnmappedOpCostEstimateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_attrs)?;
        if let Some(out) = self.output_shapes.first() {
            write!(f, " -> {out}")?;
        }
        Ok(())
    }
}

/// A placed operator: everything a cost estimator needs to price it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct OpCostEstimateKey {
    pub op_attrs: OperatorAttrs,
    pub input_shapes: Vec<ParallelTensorShape>,
    pub weight_shapes: Vec<ParallelTensorShape>,
    pub output_shapes: Vec<ParallelTensorShape>,
    pub optimizer_attrs: OptimizerAttrs,
    pub machine_view: MachineView,
}

impl OpCostEstimateKey {
    /// Drops the placement and optimizer settings.
    pub fn unmapped(&self) -> UnmappedOpCostEstimateKey {
        UnmappedOpCostEstimateKey {
            op_attrs: self.op_attrs.clone(),
            input_shapes: self.input_shapes.clone(),
            weight_shapes: self.weight_shapes.clone(),
            output_shapes: self.output_shapes.clone(),
        }
    }
}
