use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{ProjectedRow, RawRecord};

/// Seed a record is filed under when neither the document body nor the
/// origin name carries one.
pub const UNKNOWN_SEED: &str = "unknown";

/// Resolution order: structured `params.seed`, then the `seed` token of the
/// origin name, then the sentinel.
pub fn resolve_seed(record: &RawRecord) -> String {
    if let Some(seed) = record.params.get("seed") {
        match seed {
            Value::String(text) => return text.clone(),
            Value::Number(number) => return number.to_string(),
            _ => {}
        }
    }

    record
        .name_params
        .get("seed")
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SEED.to_string())
}

/// Partitions records into per-seed groups. Seeds iterate in lexicographic
/// order; insertion order within a group is preserved. No record is dropped.
pub fn group_by_seed(records: Vec<RawRecord>) -> BTreeMap<String, Vec<RawRecord>> {
    let mut groups: BTreeMap<String, Vec<RawRecord>> = BTreeMap::new();
    for record in records {
        let seed = resolve_seed(&record);
        groups.entry(seed).or_default().push(record);
    }
    groups
}

impl ProjectedRow {
    /// Maps one record onto the fixed row schema. Total: any field missing
    /// from the document (or mistyped along the path) takes its default,
    /// and experiment parameters fall back to origin-name tokens before
    /// defaulting.
    pub fn from_record(record: &RawRecord) -> Self {
        let results = &record.results;

        Self {
            n: param_u64(record, &["N", "n"]),
            hmax: param_u64(record, &["Hmax", "hmax"]),
            obs_count: param_u64(record, &["obsCount", "obs"]),
            placement: param_str(record, &["placement"]),
            cover_enabled: param_bool(record, &["coverEnabled", "cover"]),
            poison_rate: param_f64(record, &["poisonRate", "poison"]),

            accuracy: path_f64(results, &["accuracy"]),
            total_guesses: path_u64(results, &["total"]),
            correct_guesses: path_u64(results, &["correct"]),

            total_messages: path_u64(results, &["coverTraffic", "totalMessages"]),
            dummy_messages: path_u64(results, &["coverTraffic", "dummyMessages"]),
            dummy_fraction: path_f64(results, &["coverTraffic", "dummyFraction"]),

            graph_precision: path_f64(results, &["graphReconstruction", "accuracy", "precision"]),
            graph_recall: path_f64(results, &["graphReconstruction", "accuracy", "recall"]),
            graph_f1: path_f64(results, &["graphReconstruction", "accuracy", "f1Score"]),
            estimated_nodes: path_u64(results, &["graphReconstruction", "totalNodes"]),
            estimated_edges: path_u64(results, &["graphReconstruction", "totalEdges"]),
            avg_confidence: path_f64(results, &["graphReconstruction", "avgConfidence"]),

            total_replies: path_u64(results, &["conversations", "totalReplies"]),
            avg_reply_delay: path_f64(results, &["conversations", "avgReplyDelay"]),
            conversation_threads: path_u64(results, &["conversations", "conversationThreads"]),

            avg_path_length: path_f64(results, &["routing", "avgPathLength"]),
            path_diversity: path_f64(results, &["routing", "pathDiversity"]),
        }
    }
}

/// Walks a nested path, returning `None` on any missing or non-object
/// segment. The value-typed accessors below turn that into a default.
fn path_value<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

fn path_f64(root: &Value, path: &[&str]) -> f64 {
    path_value(root, path).and_then(Value::as_f64).unwrap_or(0.0)
}

fn path_u64(root: &Value, path: &[&str]) -> u64 {
    path_value(root, path).and_then(Value::as_u64).unwrap_or(0)
}

fn name_param<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.name_params.get(*key))
        .map(String::as_str)
}

fn param_u64(record: &RawRecord, keys: &[&str]) -> u64 {
    for key in keys {
        if let Some(value) = record.params.get(key).and_then(Value::as_u64) {
            return value;
        }
    }
    name_param(record, keys)
        .and_then(|text| text.parse().ok())
        .unwrap_or(0)
}

fn param_f64(record: &RawRecord, keys: &[&str]) -> f64 {
    for key in keys {
        if let Some(value) = record.params.get(key).and_then(Value::as_f64) {
            return value;
        }
    }
    name_param(record, keys)
        .and_then(|text| text.parse().ok())
        .unwrap_or(0.0)
}

fn param_bool(record: &RawRecord, keys: &[&str]) -> bool {
    for key in keys {
        if let Some(value) = record.params.get(key).and_then(Value::as_bool) {
            return value;
        }
    }
    name_param(record, keys)
        .map(|text| matches!(text, "true" | "on" | "1"))
        .unwrap_or(false)
}

fn param_str(record: &RawRecord, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = record.params.get(key).and_then(Value::as_str) {
            return value.to_string();
        }
    }
    name_param(record, keys)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::loader::parse_name_params;

    fn record(origin_name: &str, params: Value, results: Value) -> RawRecord {
        RawRecord {
            origin_name: origin_name.to_string(),
            name_params: parse_name_params(origin_name),
            params,
            results,
        }
    }

    #[test]
    fn projection_is_total_on_empty_documents() {
        let row = ProjectedRow::from_record(&record("bare.json", Value::Null, Value::Null));

        assert_eq!(row.n, 0);
        assert_eq!(row.placement, "unknown");
        assert!(!row.cover_enabled);
        assert_eq!(row.accuracy, 0.0);
        assert_eq!(row.graph_f1, 0.0);
        assert_eq!(row.conversation_threads, 0);
        assert_eq!(row.path_diversity, 0.0);
    }

    #[test]
    fn projection_prefers_structured_params() {
        let row = ProjectedRow::from_record(&record(
            "N-99_placement-random_seed-3.json",
            json!({"N": 20, "placement": "near-sender", "coverEnabled": true}),
            json!({"accuracy": 0.75}),
        ));

        assert_eq!(row.n, 20);
        assert_eq!(row.placement, "near-sender");
        assert!(row.cover_enabled);
        assert_eq!(row.accuracy, 0.75);
    }

    #[test]
    fn projection_falls_back_to_name_tokens() {
        let row = ProjectedRow::from_record(&record(
            "N-40_Hmax-6_obs-2_placement-central_cover-true_poison-0.2.json",
            Value::Null,
            Value::Null,
        ));

        assert_eq!(row.n, 40);
        assert_eq!(row.hmax, 6);
        assert_eq!(row.obs_count, 2);
        assert_eq!(row.placement, "central");
        assert!(row.cover_enabled);
        assert_eq!(row.poison_rate, 0.2);
    }

    #[test]
    fn projection_reads_nested_result_sections() {
        let results = json!({
            "accuracy": 0.6,
            "total": 10,
            "correct": 6,
            "coverTraffic": {"totalMessages": 200, "dummyMessages": 80, "dummyFraction": 0.4},
            "graphReconstruction": {
                "accuracy": {"precision": 0.5, "recall": 0.25, "f1Score": 0.333},
                "totalNodes": 12,
                "totalEdges": 30,
                "avgConfidence": 0.7
            },
            "conversations": {"totalReplies": 5, "avgReplyDelay": 1.5, "conversationThreads": 2},
            "routing": {"avgPathLength": 3.2, "pathDiversity": 0.9}
        });
        let row = ProjectedRow::from_record(&record("r.json", json!({"N": 10}), results));

        assert_eq!(row.total_messages, 200);
        assert_eq!(row.dummy_fraction, 0.4);
        assert_eq!(row.graph_precision, 0.5);
        assert_eq!(row.graph_f1, 0.333);
        assert_eq!(row.estimated_edges, 30);
        assert_eq!(row.total_replies, 5);
        assert_eq!(row.avg_path_length, 3.2);
    }

    #[test]
    fn seed_prefers_structured_over_name() {
        let rec = record("seed-3.json", json!({"seed": "7"}), Value::Null);
        assert_eq!(resolve_seed(&rec), "7");
    }

    #[test]
    fn seed_accepts_numeric_values() {
        let rec = record("run.json", json!({"seed": 42}), Value::Null);
        assert_eq!(resolve_seed(&rec), "42");
    }

    #[test]
    fn seed_falls_back_to_name_then_sentinel() {
        let named = record("seed-3.json", Value::Null, Value::Null);
        assert_eq!(resolve_seed(&named), "3");

        let anonymous = record("run.json", Value::Null, Value::Null);
        assert_eq!(resolve_seed(&anonymous), UNKNOWN_SEED);
    }

    #[test]
    fn grouping_keeps_every_record_exactly_once() {
        let records = vec![
            record("seed-2_a.json", Value::Null, Value::Null),
            record("seed-1_b.json", Value::Null, Value::Null),
            record("nameless.json", Value::Null, Value::Null),
            record("seed-1_c.json", Value::Null, Value::Null),
        ];

        let groups = group_by_seed(records);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, 4);

        let seeds: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(seeds, vec!["1", "2", UNKNOWN_SEED]);

        let seed_one = &groups["1"];
        assert_eq!(seed_one[0].origin_name, "seed-1_b.json");
        assert_eq!(seed_one[1].origin_name, "seed-1_c.json");
    }
}
