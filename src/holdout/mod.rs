//! Holdout orchestration: drives the samplers and writes the split tables.
//!
//! A run walks a fixed state machine — Loaded, PositivesSplit,
//! NegativesGenerated, Written — strictly in that order, terminal at
//! Written. Nothing touches the filesystem until the final phase, so any
//! sampling failure aborts before a single output file exists.

use crate::graph::has_disconnected_nodes;
use crate::sample::{
    make_negative_edges, make_positive_edges, SampleError, NEGATIVE_EDGE_LABEL,
};
use crate::table::{SchemaError, Table, TableError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Output file names, fixed so downstream tooling can rely on them
pub const POS_TRAIN_EDGES_FILE: &str = "pos_train_edges.tsv";
pub const POS_TRAIN_NODES_FILE: &str = "pos_train_nodes.tsv";
pub const POS_TEST_EDGES_FILE: &str = "pos_test_edges.tsv";
pub const POS_VALID_EDGES_FILE: &str = "pos_valid_edges.tsv";
pub const NEG_TRAIN_EDGES_FILE: &str = "neg_train_edges.tsv";
pub const NEG_TEST_EDGES_FILE: &str = "neg_test_edges.tsv";
pub const NEG_VALID_EDGES_FILE: &str = "neg_valid_edges.tsv";
pub const REPORT_FILE: &str = "holdout_report.json";

/// Errors that can occur during a holdout run
#[derive(Debug, Error)]
pub enum HoldoutError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("phase called out of order: run is at {actual:?}, expected {expected:?}")]
    InvalidState { expected: RunState, actual: RunState },
}

/// Result type for holdout operations
pub type HoldoutResult<T> = Result<T, HoldoutError>;

/// Configuration for a holdout run
#[derive(Debug, Clone, Serialize)]
pub struct HoldoutConfig {
    /// Fraction of edges kept for training, strictly between 0 and 1
    pub train_fraction: f64,
    /// Split the test portion 50/50 into test and validation
    pub validation: bool,
    /// Seed for the run RNG; every sampling decision derives from it
    pub seed: u64,
    /// Minimum degree both endpoints need for an edge to be held out
    pub min_degree: usize,
    /// When set, only edges touching one of these categories are held out
    pub node_types: Option<Vec<String>>,
    /// When set, validation splits draw from a fresh RNG seeded with this
    /// value instead of continuing the run RNG stream
    pub validation_seed: Option<u64>,
}

impl Default for HoldoutConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            validation: false,
            seed: 42,
            min_degree: 1,
            node_types: None,
            validation_seed: None,
        }
    }
}

impl HoldoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    pub fn with_validation(mut self, validation: bool) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_min_degree(mut self, min_degree: usize) -> Self {
        self.min_degree = min_degree;
        self
    }

    pub fn with_node_types(mut self, types: Vec<String>) -> Self {
        self.node_types = Some(types);
        self
    }

    pub fn with_validation_seed(mut self, seed: u64) -> Self {
        self.validation_seed = Some(seed);
        self
    }
}

/// Observable phase of a holdout run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Loaded,
    PositivesSplit,
    NegativesGenerated,
    Written,
}

/// Train/test/(validation) tables for one polarity
#[derive(Debug, Clone)]
struct SplitTables {
    train: Table,
    test: Table,
    valid: Option<Table>,
}

#[derive(Debug)]
enum Phase {
    Loaded,
    PositivesSplit {
        pos: SplitTables,
    },
    NegativesGenerated {
        pos: SplitTables,
        neg: SplitTables,
        neg_requested: usize,
    },
    Written,
}

impl Phase {
    fn state(&self) -> RunState {
        match self {
            Phase::Loaded => RunState::Loaded,
            Phase::PositivesSplit { .. } => RunState::PositivesSplit,
            Phase::NegativesGenerated { .. } => RunState::NegativesGenerated,
            Phase::Written => RunState::Written,
        }
    }
}

/// Counts and configuration of a completed run, also written as
/// `holdout_report.json` next to the split tables
#[derive(Debug, Clone, Serialize)]
pub struct HoldoutReport {
    pub config: HoldoutConfig,
    pub input_nodes: usize,
    pub input_edges: usize,
    pub pos_train_edges: usize,
    pub pos_train_nodes: usize,
    pub pos_test_edges: usize,
    pub pos_valid_edges: Option<usize>,
    pub neg_requested: usize,
    pub neg_sampled: usize,
    pub neg_train_edges: usize,
    pub neg_test_edges: usize,
    pub neg_valid_edges: Option<usize>,
}

/// A single holdout run over one pair of node/edge tables.
///
/// The run owns its in-memory copies of the input tables and a seeded RNG;
/// nothing is shared across runs. The four sampling decisions (positive
/// test selection, positive validation split, negative pool generation,
/// negative validation split) advance the RNG in that fixed order, so two
/// runs with the same inputs and seed produce byte-identical outputs.
#[derive(Debug)]
pub struct HoldoutRun {
    config: HoldoutConfig,
    rng: StdRng,
    phase: Phase,
    nodes: Table,
    edges: Table,
}

impl HoldoutRun {
    /// Read the node and edge tables from disk and enter the Loaded state
    pub fn load(
        nodes_path: impl AsRef<Path>,
        edges_path: impl AsRef<Path>,
        config: HoldoutConfig,
    ) -> HoldoutResult<Self> {
        let nodes = Table::read_tsv(nodes_path)?;
        let edges = Table::read_tsv(edges_path)?;
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            "loaded input tables"
        );
        Self::from_tables(nodes, edges, config)
    }

    /// Start a run from in-memory tables
    pub fn from_tables(
        nodes: Table,
        edges: Table,
        config: HoldoutConfig,
    ) -> HoldoutResult<Self> {
        if !(config.train_fraction > 0.0 && config.train_fraction < 1.0) {
            return Err(SampleError::InvalidFraction(config.train_fraction).into());
        }
        if has_disconnected_nodes(&edges, &nodes)? {
            warn!("node table contains ids never referenced by any edge");
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            phase: Phase::Loaded,
            nodes,
            edges,
        })
    }

    /// Current state of the run
    pub fn state(&self) -> RunState {
        self.phase.state()
    }

    fn expect_state(&self, expected: RunState) -> HoldoutResult<()> {
        let actual = self.state();
        if actual == expected {
            Ok(())
        } else {
            Err(HoldoutError::InvalidState { expected, actual })
        }
    }

    /// Phase 2: select held-out positive edges, and the validation split
    /// when requested
    pub fn split_positives(&mut self) -> HoldoutResult<()> {
        self.expect_state(RunState::Loaded)?;

        let (train, mut test) = make_positive_edges(
            &self.nodes,
            &self.edges,
            self.config.train_fraction,
            self.config.node_types.as_deref(),
            self.config.min_degree,
            &mut self.rng,
        )?;
        let valid = if self.config.validation {
            let (kept, valid) = self.split_validation(&test);
            test = kept;
            Some(valid)
        } else {
            None
        };

        info!(
            train = train.len(),
            test = test.len(),
            valid = valid.as_ref().map_or(0, Table::len),
            "split positive edges"
        );
        self.phase = Phase::PositivesSplit {
            pos: SplitTables { train, test, valid },
        };
        Ok(())
    }

    /// Phase 3: generate the negative pool and partition it like the
    /// positives.
    ///
    /// The pool targets one negative per original edge (1:1 ratio) and is
    /// rejected against the full original edge table, so no negative
    /// coincides with any positive, held out or not.
    pub fn generate_negatives(&mut self) -> HoldoutResult<()> {
        self.expect_state(RunState::PositivesSplit)?;

        let requested = self.edges.len();
        let pool = make_negative_edges(
            &self.nodes,
            &self.edges,
            requested,
            NEGATIVE_EDGE_LABEL,
            NEGATIVE_EDGE_LABEL,
            &mut self.rng,
        )?;
        let sampled = pool.len();

        // Pool rows are already in random draw order; slicing partitions
        // them uniformly.
        let test_size = ((1.0 - self.config.train_fraction) * sampled as f64).round() as usize;
        let train = take_rows(&pool, 0, sampled - test_size);
        let mut test = take_rows(&pool, sampled - test_size, sampled);
        let valid = if self.config.validation {
            let (kept, valid) = self.split_validation(&test);
            test = kept;
            Some(valid)
        } else {
            None
        };

        info!(
            requested,
            sampled,
            train = train.len(),
            test = test.len(),
            valid = valid.as_ref().map_or(0, Table::len),
            "generated negative edges"
        );
        match std::mem::replace(&mut self.phase, Phase::Loaded) {
            Phase::PositivesSplit { pos } => {
                self.phase = Phase::NegativesGenerated {
                    pos,
                    neg: SplitTables { train, test, valid },
                    neg_requested: requested,
                };
                Ok(())
            }
            other => {
                // expect_state above makes this unreachable; restore rather
                // than panic if it ever is not.
                let actual = other.state();
                self.phase = other;
                Err(HoldoutError::InvalidState {
                    expected: RunState::PositivesSplit,
                    actual,
                })
            }
        }
    }

    /// Phase 4: write every split table plus the run report into
    /// `out_dir`, creating the directory if absent.
    ///
    /// A write failure propagates immediately; files already written stay
    /// in place, there is no rollback.
    pub fn write(&mut self, out_dir: impl AsRef<Path>) -> HoldoutResult<HoldoutReport> {
        let out_dir = out_dir.as_ref();
        let (pos, neg, neg_requested) = match &self.phase {
            Phase::NegativesGenerated {
                pos,
                neg,
                neg_requested,
            } => (pos, neg, *neg_requested),
            other => {
                return Err(HoldoutError::InvalidState {
                    expected: RunState::NegativesGenerated,
                    actual: other.state(),
                })
            }
        };

        std::fs::create_dir_all(out_dir)?;

        let train_nodes = training_nodes(&self.nodes, &pos.train)?;
        pos.train.write_tsv(out_dir.join(POS_TRAIN_EDGES_FILE))?;
        train_nodes.write_tsv(out_dir.join(POS_TRAIN_NODES_FILE))?;
        pos.test.write_tsv(out_dir.join(POS_TEST_EDGES_FILE))?;
        if let Some(valid) = &pos.valid {
            valid.write_tsv(out_dir.join(POS_VALID_EDGES_FILE))?;
        }
        neg.train.write_tsv(out_dir.join(NEG_TRAIN_EDGES_FILE))?;
        neg.test.write_tsv(out_dir.join(NEG_TEST_EDGES_FILE))?;
        if let Some(valid) = &neg.valid {
            valid.write_tsv(out_dir.join(NEG_VALID_EDGES_FILE))?;
        }

        let neg_sampled = neg.train.len()
            + neg.test.len()
            + neg.valid.as_ref().map_or(0, Table::len);
        let report = HoldoutReport {
            config: self.config.clone(),
            input_nodes: self.nodes.len(),
            input_edges: self.edges.len(),
            pos_train_edges: pos.train.len(),
            pos_train_nodes: train_nodes.len(),
            pos_test_edges: pos.test.len(),
            pos_valid_edges: pos.valid.as_ref().map(Table::len),
            neg_requested,
            neg_sampled,
            neg_train_edges: neg.train.len(),
            neg_test_edges: neg.test.len(),
            neg_valid_edges: neg.valid.as_ref().map(Table::len),
        };
        serde_json::to_writer_pretty(File::create(out_dir.join(REPORT_FILE))?, &report)?;

        info!(output = %out_dir.display(), "wrote holdout tables");
        self.phase = Phase::Written;
        Ok(report)
    }

    /// Split a table 50/50 with a seeded draw.
    ///
    /// By default the run RNG stream continues, decorrelating the
    /// validation boundary from the first split. Setting
    /// `validation_seed` reproduces the original pipeline's behavior of
    /// reusing one seed value for the nested draw.
    fn split_validation(&mut self, table: &Table) -> (Table, Table) {
        match self.config.validation_seed {
            Some(seed) => split_half(table, &mut StdRng::seed_from_u64(seed)),
            None => split_half(table, &mut self.rng),
        }
    }
}

/// Run all four phases and return the report
pub fn run(
    nodes_path: impl AsRef<Path>,
    edges_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: HoldoutConfig,
) -> HoldoutResult<HoldoutReport> {
    let mut run = HoldoutRun::load(nodes_path, edges_path, config)?;
    run.split_positives()?;
    run.generate_negatives()?;
    run.write(out_dir)
}

/// Draw half of the rows (rounded down) into a second table
fn split_half(table: &Table, rng: &mut impl Rng) -> (Table, Table) {
    let drawn: HashSet<usize> = rand::seq::index::sample(rng, table.len(), table.len() / 2)
        .into_iter()
        .collect();

    let mut kept = Table::new(table.header().to_vec());
    let mut held = Table::new(table.header().to_vec());
    for (i, row) in table.rows().iter().enumerate() {
        if drawn.contains(&i) {
            held.push_row(row.clone());
        } else {
            kept.push_row(row.clone());
        }
    }
    (kept, held)
}

/// Copy rows in `[start, end)` into a new table
fn take_rows(table: &Table, start: usize, end: usize) -> Table {
    Table::with_rows(table.header().to_vec(), table.rows()[start..end].to_vec())
}

/// Node rows whose id appears as an endpoint of a training edge
fn training_nodes(nodes: &Table, train_edges: &Table) -> Result<Table, SchemaError> {
    let id_col = nodes.require_column("id", "node")?;
    let subj_col = train_edges.require_column("subject", "edge")?;
    let obj_col = train_edges.require_column("object", "edge")?;

    let mut keep: HashSet<&str> = HashSet::new();
    for row in train_edges.rows() {
        keep.insert(row[subj_col].as_str());
        keep.insert(row[obj_col].as_str());
    }

    let mut out = Table::new(nodes.header().to_vec());
    for row in nodes.rows() {
        if keep.contains(row[id_col].as_str()) {
            out.push_row(row.clone());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_table(n: usize) -> Table {
        let mut table = Table::new(vec!["id".to_string(), "category".to_string()]);
        for i in 1..=n {
            table.push_row(vec![format!("g{}", i), "gene".to_string()]);
        }
        table
    }

    /// Ring of n nodes and n edges, every node degree 2
    fn ring_edges(n: usize) -> Table {
        let mut table = Table::new(vec![
            "subject".to_string(),
            "predicate".to_string(),
            "object".to_string(),
            "relation".to_string(),
        ]);
        for i in 0..n {
            table.push_row(vec![
                format!("g{}", i + 1),
                "biolink:interacts_with".to_string(),
                format!("g{}", (i + 1) % n + 1),
                "RO:0002434".to_string(),
            ]);
        }
        table
    }

    #[test]
    fn test_phases_must_run_in_order() {
        let mut run =
            HoldoutRun::from_tables(node_table(10), ring_edges(10), HoldoutConfig::default())
                .unwrap();
        assert_eq!(run.state(), RunState::Loaded);
        assert!(format!("{:?}", run).contains("Loaded"));

        let err = run.generate_negatives().unwrap_err();
        assert!(matches!(err, HoldoutError::InvalidState { .. }));

        run.split_positives().unwrap();
        assert_eq!(run.state(), RunState::PositivesSplit);

        let err = run.split_positives().unwrap_err();
        assert!(matches!(err, HoldoutError::InvalidState { .. }));

        run.generate_negatives().unwrap();
        assert_eq!(run.state(), RunState::NegativesGenerated);
    }

    #[test]
    fn test_written_is_terminal() {
        let out = tempfile::tempdir().unwrap();
        let mut run =
            HoldoutRun::from_tables(node_table(10), ring_edges(10), HoldoutConfig::default())
                .unwrap();
        run.split_positives().unwrap();
        run.generate_negatives().unwrap();
        run.write(out.path()).unwrap();
        assert_eq!(run.state(), RunState::Written);

        let err = run.write(out.path()).unwrap_err();
        assert!(matches!(err, HoldoutError::InvalidState { .. }));
    }

    #[test]
    fn test_invalid_fraction_rejected_at_load() {
        let config = HoldoutConfig::default().with_train_fraction(1.0);
        let err = HoldoutRun::from_tables(node_table(5), ring_edges(5), config).unwrap_err();
        assert!(matches!(
            err,
            HoldoutError::Sample(SampleError::InvalidFraction(_))
        ));
    }

    #[test]
    fn test_validation_splits_test_in_half() {
        let out = tempfile::tempdir().unwrap();
        let config = HoldoutConfig::default().with_validation(true);
        let mut run =
            HoldoutRun::from_tables(node_table(100), ring_edges(100), config).unwrap();
        run.split_positives().unwrap();
        run.generate_negatives().unwrap();
        let report = run.write(out.path()).unwrap();

        assert_eq!(report.pos_train_edges, 80);
        assert_eq!(report.pos_test_edges, 10);
        assert_eq!(report.pos_valid_edges, Some(10));
        assert_eq!(report.neg_train_edges, 80);
        assert_eq!(report.neg_test_edges, 10);
        assert_eq!(report.neg_valid_edges, Some(10));
    }

    #[test]
    fn test_training_nodes_are_reduced_to_train_endpoints() {
        let nodes = node_table(3);
        let mut train = Table::new(vec!["subject".to_string(), "object".to_string()]);
        train.push_row(vec!["g1".to_string(), "g2".to_string()]);

        let reduced = training_nodes(&nodes, &train).unwrap();
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced.get(0, "id"), Some("g1"));
        assert_eq!(reduced.get(1, "id"), Some("g2"));
    }

    #[test]
    fn test_split_half_partitions_rows() {
        let mut table = Table::new(vec!["subject".to_string()]);
        for i in 0..11 {
            table.push_row(vec![format!("g{}", i)]);
        }
        let mut rng = StdRng::seed_from_u64(4);
        let (kept, held) = split_half(&table, &mut rng);
        assert_eq!(held.len(), 5);
        assert_eq!(kept.len(), 6);
    }

    #[test]
    fn test_fixed_validation_seed_reproduces_the_nested_draw() {
        let config = HoldoutConfig::default()
            .with_validation(true)
            .with_validation_seed(7);

        let mut counts = Vec::new();
        for _ in 0..2 {
            let mut run = HoldoutRun::from_tables(
                node_table(40),
                ring_edges(40),
                config.clone(),
            )
            .unwrap();
            run.split_positives().unwrap();
            run.generate_negatives().unwrap();
            match &run.phase {
                Phase::NegativesGenerated { pos, .. } => {
                    counts.push((pos.test.clone(), pos.valid.clone()))
                }
                _ => panic!("unexpected phase"),
            }
        }
        assert_eq!(counts[0].0, counts[1].0);
        assert_eq!(counts[0].1, counts[1].1);
    }
}
