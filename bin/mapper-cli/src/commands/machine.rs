// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mapper machine` command: resource splits and allowed views.

use machine_mapping::MapperConfig;
use machine_spec::{get_allowed_machine_views, get_machine_resource_splits, OperatorTaskSpace};

pub fn execute(
    config: &MapperConfig,
    nodes: Option<usize>,
    gpus_per_node: Option<usize>,
    degrees: String,
) -> anyhow::Result<()> {
    let mut machine = config.machine.clone();
    if let Some(n) = nodes {
        machine.num_nodes = n;
    }
    if let Some(g) = gpus_per_node {
        machine.num_gpus_per_node = g;
    }
    machine.validate()?;
    let task = OperatorTaskSpace::new(parse_degrees(&degrees)?);

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              mapper · Machine Explorer              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Machine: {}", machine.summary());
    println!();

    // ── Resource Splits ────────────────────────────────────────
    let splits = get_machine_resource_splits(&machine);
    println!("  Resource splits ({}):", splits.len());
    for (left, right) in &splits {
        println!("   {left:<12} | {right}");
    }
    println!();

    // ── Allowed Views ──────────────────────────────────────────
    let views = get_allowed_machine_views(&machine, &task, config.device_type);
    println!(
        "  Allowed {} views for degrees {:?} ({} task(s)): {}",
        config.device_type,
        task.degrees,
        task.num_tasks(),
        views.len(),
    );
    for view in &views {
        println!("   {view}");
    }
    println!();
    Ok(())
}

fn parse_degrees(s: &str) -> anyhow::Result<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let d: usize = p
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid degree '{p}': {e}"))?;
            anyhow::ensure!(d > 0, "degree must be positive, got 0");
            Ok(d)
        })
        .collect()
}
