// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mapper solve` command: run the search and select a mapping.

use machine_mapping::{
    optimize_machine_mapping, MachineMappingContext, MapperConfig, MappingError,
    TableCostEstimator,
};
use machine_spec::MemoryBudget;
use problem_tree::ProblemLoader;
use std::path::PathBuf;

pub fn execute(
    config: &MapperConfig,
    problem: PathBuf,
    costs: PathBuf,
    budget: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let problem = ProblemLoader::load(&problem).map_err(|e| {
        anyhow::anyhow!("failed to load problem from '{}': {e}", problem.display())
    })?;
    let estimator = TableCostEstimator::load(&costs)?;
    let machine = config.machine_spec()?;
    let budget = match budget {
        Some(s) => Some(MemoryBudget::parse(&s)?),
        None => config.parse_budget()?,
    };

    let views = config.allowed_views();
    let ctx = MachineMappingContext::new(&estimator, &config.optimizer, &views);
    let report = match optimize_machine_mapping(&problem, &machine, &ctx, budget) {
        Ok(r) => r,
        Err(MappingError::Infeasible) => {
            anyhow::bail!(
                "no feasible mapping of '{}' on {}",
                problem.name,
                machine.summary()
            )
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              mapper · Machine Mapping               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Inputs ─────────────────────────────────────────────────
    println!("  {}", problem.summary());
    println!("  Machine:   {}", machine.summary());
    println!("  Optimizer: {:?}", config.optimizer);
    println!(
        "  Budget:    {}",
        budget.map_or_else(|| "unlimited".to_string(), |b| b.to_string())
    );
    println!(
        "  Costs:     {} op entries, {} movement entries",
        estimator.num_op_entries(),
        estimator.num_movement_entries()
    );
    println!();

    // ── Frontier ───────────────────────────────────────────────
    println!(
        "  {:<4} {:>12} {:>12} {:>12} {:>12}",
        "#", "Forward", "Backward", "Total", "Memory",
    );
    println!("  {}", "-".repeat(56));
    for (i, p) in report.frontier.points().iter().enumerate() {
        let marker = if *p == report.selected { "*" } else { " " };
        println!(
            "  {:<4} {:>12} {:>12} {:>12} {:>10} B",
            format!("{i}{marker}"),
            p.cost.forward_runtime.to_string(),
            p.cost.backward_runtime.to_string(),
            p.cost.total_runtime().to_string(),
            p.cost.memory_usage,
        );
    }
    println!();

    // ── Selected Mapping ───────────────────────────────────────
    println!("  Selected mapping:");
    for (path, view) in report.selected.mapping.iter() {
        let op = problem
            .tree()
            .leaf_at_path(path)
            .map(|k| k.to_string())
            .unwrap_or_else(|_| "?".to_string());
        println!("   {:<10} {:<32} {}", path.to_string(), op, view);
    }
    println!();
    println!("  {}", report.cache_stats.summary());
    println!("  Search time: {:.2?}", report.elapsed);
    println!();
    Ok(())
}
