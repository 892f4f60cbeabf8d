// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mapper
//!
//! Command-line interface for the machine-mapping optimizer.
//!
//! ## Usage
//! ```bash
//! # Find the runtime/memory frontier for a problem and pick a mapping
//! mapper -c mapper.toml solve --problem demos/two-layer.json --costs demos/two-layer-costs.json --budget 4B
//!
//! # Print a problem tree
//! mapper inspect --problem demos/two-layer.json
//!
//! # Show resource splits and allowed views for a task space
//! mapper machine --nodes 2 --gpus-per-node 4 --degrees 2,2
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mapper",
    about = "Memory-aware machine-mapping search for series-parallel problem trees",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (machine, optimizer, budget).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for Pareto-optimal mappings and select one.
    Solve {
        /// Problem tree (JSON).
        #[arg(short, long)]
        problem: PathBuf,

        /// Cost table (JSON).
        #[arg(long)]
        costs: PathBuf,

        /// Memory budget (e.g., "512M", "16G"); overrides the config file.
        #[arg(short, long)]
        budget: Option<String>,

        /// Print the report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the structure of a problem tree.
    Inspect {
        /// Problem tree (JSON).
        #[arg(short, long)]
        problem: PathBuf,
    },

    /// Show resource splits and allowed machine views.
    Machine {
        /// Number of nodes; overrides the config file.
        #[arg(long)]
        nodes: Option<usize>,

        /// GPUs per node; overrides the config file.
        #[arg(long)]
        gpus_per_node: Option<usize>,

        /// Comma-separated parallel degrees of the task space (e.g., "2,2").
        #[arg(short, long, default_value = "")]
        degrees: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Solve {
            problem,
            costs,
            budget,
            json,
        } => commands::solve::execute(&config, problem, costs, budget, json),
        Commands::Inspect { problem } => commands::inspect::execute(problem),
        Commands::Machine {
            nodes,
            gpus_per_node,
            degrees,
        } => commands::machine::execute(&config, nodes, gpus_per_node, degrees),
    }
}
