// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mapper inspect` command: display a problem tree.

use problem_tree::{ProblemLoader, ProblemTree};
use std::path::PathBuf;

pub fn execute(problem: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              mapper · Problem Inspector             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let problem = ProblemLoader::load(&problem).map_err(|e| {
        anyhow::anyhow!("failed to load problem from '{}': {e}", problem.display())
    })?;
    let tree = problem.tree();

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", problem.summary());
    let (series, parallel, moved) = count_splits(tree);
    println!("  Series splits:   {series} ({moved} tensor(s) crossing)");
    println!("  Parallel splits: {parallel}");
    println!();

    // ── Structure ──────────────────────────────────────────────
    for line in tree.to_string().lines() {
        println!("  {line}");
    }
    println!();

    // ── Leaves ─────────────────────────────────────────────────
    println!("  {:<10} {:<24} {:>10} {:>8}", "Path", "Operator", "Tensors", "Tasks");
    println!("  {}", "-".repeat(56));
    for path in tree.all_leaf_paths() {
        let leaf = tree.leaf_at_path(&path)?;
        println!(
            "  {:<10} {:<24} {:>10} {:>8}",
            path.to_string(),
            leaf.op_attrs.to_string(),
            leaf.all_shapes().count(),
            leaf.operator_task_space().num_tasks(),
        );
    }
    println!();
    Ok(())
}

/// Returns `(series nodes, parallel nodes, tensors moved across series nodes)`.
fn count_splits(tree: &ProblemTree) -> (usize, usize, usize) {
    match tree {
        ProblemTree::Leaf(_) => (0, 0, 0),
        ProblemTree::Series(s) => {
            let (ls, lp, lm) = count_splits(&s.left);
            let (rs, rp, rm) = count_splits(&s.right);
            (ls + rs + 1, lp + rp, lm + rm + s.tensor_movement.movements.len())
        }
        ProblemTree::Parallel(p) => {
            let (ls, lp, lm) = count_splits(&p.left);
            let (rs, rp, rm) = count_splits(&p.right);
            (ls + rs, lp + rp + 1, lm + rm)
        }
    }
}
