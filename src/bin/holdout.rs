//! Holdout CLI — train/test splits for knowledge graph edges.
//!
//! Usage:
//!   holdout split --nodes nodes.tsv --edges edges.tsv --output out/
//!   holdout check --nodes nodes.tsv --edges edges.tsv

use clap::{Parser, Subcommand};
use holdout::{has_disconnected_nodes, HoldoutConfig, Table};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "holdout",
    version,
    about = "Edge holdout and negative sampling for knowledge graph link prediction"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce train/test(/validation) splits of positive and negative edges
    Split {
        /// Node table (TSV with an `id` column)
        #[arg(long)]
        nodes: PathBuf,
        /// Edge table (TSV with `subject` and `object` columns)
        #[arg(long)]
        edges: PathBuf,
        /// Output directory, created if absent
        #[arg(short, long)]
        output: PathBuf,
        /// Fraction of edges kept for training, strictly between 0 and 1
        #[arg(long, default_value = "0.8")]
        train_fraction: f64,
        /// Also produce validation splits (50/50 from the test portion)
        #[arg(long)]
        validation: bool,
        /// Random seed; the whole run is reproducible from this value
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Minimum degree both endpoints need for an edge to be held out
        #[arg(long, default_value = "1")]
        min_degree: usize,
        /// Only hold out edges touching one of these categories (repeatable)
        #[arg(long = "node-type")]
        node_types: Vec<String>,
        /// Seed the validation split separately instead of continuing the
        /// run RNG stream
        #[arg(long)]
        validation_seed: Option<u64>,
    },
    /// Report disconnected nodes and dangling edge endpoints without
    /// writing anything
    Check {
        /// Node table (TSV with an `id` column)
        #[arg(long)]
        nodes: PathBuf,
        /// Edge table (TSV with `subject` and `object` columns)
        #[arg(long)]
        edges: PathBuf,
    },
}

#[allow(clippy::too_many_arguments)]
fn cmd_split(
    nodes: &PathBuf,
    edges: &PathBuf,
    output: &PathBuf,
    train_fraction: f64,
    validation: bool,
    seed: u64,
    min_degree: usize,
    node_types: Vec<String>,
    validation_seed: Option<u64>,
) -> i32 {
    let mut config = HoldoutConfig::default()
        .with_train_fraction(train_fraction)
        .with_validation(validation)
        .with_seed(seed)
        .with_min_degree(min_degree);
    if !node_types.is_empty() {
        config = config.with_node_types(node_types);
    }
    if let Some(vseed) = validation_seed {
        config = config.with_validation_seed(vseed);
    }

    match holdout::run(nodes, edges, output, config) {
        Ok(report) => {
            println!("Wrote holdout tables to {}", output.display());
            println!(
                "positive: {} train / {} test{}",
                report.pos_train_edges,
                report.pos_test_edges,
                report
                    .pos_valid_edges
                    .map(|n| format!(" / {} valid", n))
                    .unwrap_or_default()
            );
            println!(
                "negative: {} train / {} test{} ({} sampled of {} requested)",
                report.neg_train_edges,
                report.neg_test_edges,
                report
                    .neg_valid_edges
                    .map(|n| format!(" / {} valid", n))
                    .unwrap_or_default(),
                report.neg_sampled,
                report.neg_requested
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_check(nodes_path: &PathBuf, edges_path: &PathBuf) -> i32 {
    let nodes = match Table::read_tsv(nodes_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", nodes_path.display(), e);
            return 1;
        }
    };
    let edges = match Table::read_tsv(edges_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", edges_path.display(), e);
            return 1;
        }
    };
    match has_disconnected_nodes(&edges, &nodes) {
        Ok(true) => {
            println!("Node table contains ids never referenced by any edge.");
            0
        }
        Ok(false) => {
            println!("Every node id is referenced by at least one edge.");
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Split {
            nodes,
            edges,
            output,
            train_fraction,
            validation,
            seed,
            min_degree,
            node_types,
            validation_seed,
        } => cmd_split(
            &nodes,
            &edges,
            &output,
            train_fraction,
            validation,
            seed,
            min_degree,
            node_types,
            validation_seed,
        ),
        Commands::Check { nodes, edges } => cmd_check(&nodes, &edges),
    };
    std::process::exit(code);
}
