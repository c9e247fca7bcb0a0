use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// One parsed result document plus its provenance. Created once by the
/// loader and immutable afterwards.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub origin_name: String,
    /// Top-level `params` object, or `Value::Null` when the document has none.
    pub params: Value,
    /// Top-level `results` object, or `Value::Null` when the document has none.
    pub results: Value,
    /// `key-value` tokens recovered from the origin name, fallback source
    /// for parameters missing from `params`.
    pub name_params: HashMap<String, String>,
}

/// One row of the analysis table. The schema is fixed here; all defaulting
/// happens in `ProjectedRow::from_record`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    pub n: u64,
    pub hmax: u64,
    pub obs_count: u64,
    pub placement: String,
    pub cover_enabled: bool,
    pub poison_rate: f64,

    pub accuracy: f64,
    pub total_guesses: u64,
    pub correct_guesses: u64,

    pub total_messages: u64,
    pub dummy_messages: u64,
    pub dummy_fraction: f64,

    pub graph_precision: f64,
    pub graph_recall: f64,
    pub graph_f1: f64,
    pub estimated_nodes: u64,
    pub estimated_edges: u64,
    pub avg_confidence: f64,

    pub total_replies: u64,
    pub avg_reply_delay: f64,
    pub conversation_threads: u64,

    pub avg_path_length: f64,
    pub path_diversity: f64,
}

/// The tuple comparable runs are grouped by for aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub n: u64,
    pub placement: String,
    pub cover_enabled: bool,
}

impl ConfigKey {
    pub fn of(row: &ProjectedRow) -> Self {
        Self {
            n: row.n,
            placement: row.placement.clone(),
            cover_enabled: row.cover_enabled,
        }
    }
}

/// Aggregate statistics for one configuration group.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub key: ConfigKey,
    pub count: usize,
    pub accuracy_mean: f64,
    pub accuracy_std: f64,
    pub accuracy_min: f64,
    pub accuracy_max: f64,
    pub graph_f1_mean: f64,
    pub graph_f1_std: f64,
    pub dummy_fraction_mean: f64,
    pub total_messages_mean: f64,
}

/// Per-seed accuracy and reconstruction aggregates for the cross-seed view.
#[derive(Debug, Clone)]
pub struct SeedStats {
    pub seed: String,
    pub count: usize,
    pub accuracy_mean: f64,
    pub accuracy_std: f64,
    pub graph_f1_mean: f64,
    pub graph_f1_std: f64,
}

/// Corpus-wide scalars reported by the combined stage.
#[derive(Debug, Clone)]
pub struct OverallStats {
    pub total_experiments: usize,
    pub seeds_analyzed: usize,
    pub accuracy_mean: f64,
    pub accuracy_std: f64,
    pub graph_f1_mean: f64,
    pub graph_f1_std: f64,
    pub cover_traffic_benefit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedManifestEntry {
    pub seed: String,
    pub record_count: usize,
}

/// Self-description of one completed analysis run, written to the output root.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_dir: String,
    pub output_dir: String,
    pub records_loaded: usize,
    pub sources_skipped: usize,
    pub seed_count: usize,
    pub seeds: Vec<SeedManifestEntry>,
}
