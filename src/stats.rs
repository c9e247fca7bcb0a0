use std::collections::HashMap;

use crate::model::{ConfigKey, OverallStats, ProjectedRow, SeedStats, SummaryRow};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (denominator n - 1), 0.0 below two samples.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Groups rows by (N, placement, cover_enabled) and aggregates each group.
/// Configuration keys appear once each, in first-occurrence order.
pub fn summarize_by_config(rows: &[ProjectedRow]) -> Vec<SummaryRow> {
    let mut order: Vec<ConfigKey> = Vec::new();
    let mut buckets: HashMap<ConfigKey, Vec<&ProjectedRow>> = HashMap::new();

    for row in rows {
        let key = ConfigKey::of(row);
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(row);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &buckets[&key];
            let accuracy: Vec<f64> = members.iter().map(|r| r.accuracy).collect();
            let graph_f1: Vec<f64> = members.iter().map(|r| r.graph_f1).collect();
            let dummy_fraction: Vec<f64> = members.iter().map(|r| r.dummy_fraction).collect();
            let total_messages: Vec<f64> =
                members.iter().map(|r| r.total_messages as f64).collect();

            SummaryRow {
                count: members.len(),
                accuracy_mean: mean(&accuracy),
                accuracy_std: std_dev(&accuracy),
                accuracy_min: min(&accuracy),
                accuracy_max: max(&accuracy),
                graph_f1_mean: mean(&graph_f1),
                graph_f1_std: std_dev(&graph_f1),
                dummy_fraction_mean: mean(&dummy_fraction),
                total_messages_mean: mean(&total_messages),
                key,
            }
        })
        .collect()
}

/// Rows with the minimum and maximum adversary accuracy; ties resolve to
/// the first occurrence in input order. `None` on an empty row set.
pub fn best_and_worst_privacy(rows: &[ProjectedRow]) -> Option<(&ProjectedRow, &ProjectedRow)> {
    let mut best = rows.first()?;
    let mut worst = best;

    for row in &rows[1..] {
        if row.accuracy < best.accuracy {
            best = row;
        }
        if row.accuracy > worst.accuracy {
            worst = row;
        }
    }

    Some((best, worst))
}

/// Mean accuracy without cover traffic minus mean accuracy with it.
/// Undefined (`None`) when no row ran with cover traffic enabled; a missing
/// no-cover side contributes a mean of 0.0 rather than an error.
pub fn cover_traffic_benefit(rows: &[ProjectedRow]) -> Option<f64> {
    if !rows.iter().any(|r| r.cover_enabled) {
        return None;
    }

    let without: Vec<f64> = rows
        .iter()
        .filter(|r| !r.cover_enabled)
        .map(|r| r.accuracy)
        .collect();
    let with: Vec<f64> = rows
        .iter()
        .filter(|r| r.cover_enabled)
        .map(|r| r.accuracy)
        .collect();

    Some(mean(&without) - mean(&with))
}

/// Mean dummy-message fraction across cover-enabled rows, under the same
/// conditional rule as the benefit scalar.
pub fn cover_traffic_overhead(rows: &[ProjectedRow]) -> Option<f64> {
    let with: Vec<f64> = rows
        .iter()
        .filter(|r| r.cover_enabled)
        .map(|r| r.dummy_fraction)
        .collect();

    if with.is_empty() { None } else { Some(mean(&with)) }
}

/// Per-seed accuracy/F1 aggregates for the cross-seed comparison. Seeds are
/// expected in the caller's (already deterministic) order.
pub fn per_seed_stats(tables: &[(String, Vec<ProjectedRow>)]) -> Vec<SeedStats> {
    tables
        .iter()
        .map(|(seed, rows)| {
            let accuracy: Vec<f64> = rows.iter().map(|r| r.accuracy).collect();
            let graph_f1: Vec<f64> = rows.iter().map(|r| r.graph_f1).collect();
            SeedStats {
                seed: seed.clone(),
                count: rows.len(),
                accuracy_mean: mean(&accuracy),
                accuracy_std: std_dev(&accuracy),
                graph_f1_mean: mean(&graph_f1),
                graph_f1_std: std_dev(&graph_f1),
            }
        })
        .collect()
}

pub fn overall_stats(seed_count: usize, rows: &[ProjectedRow]) -> OverallStats {
    let accuracy: Vec<f64> = rows.iter().map(|r| r.accuracy).collect();
    let graph_f1: Vec<f64> = rows.iter().map(|r| r.graph_f1).collect();

    OverallStats {
        total_experiments: rows.len(),
        seeds_analyzed: seed_count,
        accuracy_mean: mean(&accuracy),
        accuracy_std: std_dev(&accuracy),
        graph_f1_mean: mean(&graph_f1),
        graph_f1_std: std_dev(&graph_f1),
        cover_traffic_benefit: cover_traffic_benefit(rows).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u64, placement: &str, cover: bool, accuracy: f64) -> ProjectedRow {
        ProjectedRow {
            n,
            hmax: 0,
            obs_count: 0,
            placement: placement.to_string(),
            cover_enabled: cover,
            poison_rate: 0.0,
            accuracy,
            total_guesses: 0,
            correct_guesses: 0,
            total_messages: 100,
            dummy_messages: 0,
            dummy_fraction: if cover { 0.4 } else { 0.0 },
            graph_precision: 0.0,
            graph_recall: 0.0,
            graph_f1: accuracy / 2.0,
            estimated_nodes: 0,
            estimated_edges: 0,
            avg_confidence: 0.0,
            total_replies: 0,
            avg_reply_delay: 0.0,
            conversation_threads: 0,
            avg_path_length: 0.0,
            path_diversity: 0.0,
        }
    }

    #[test]
    fn mean_and_std_handle_degenerate_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[0.5]), 0.0);
        assert!((mean(&[0.2, 0.4]) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn std_dev_is_sample_deviation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((std_dev(&values) - 1.290_994_448_735_805_6).abs() < 1e-12);
    }

    #[test]
    fn summary_groups_in_first_occurrence_order() {
        let rows = vec![
            row(20, "random", true, 0.5),
            row(10, "random", false, 0.9),
            row(20, "random", true, 0.3),
            row(10, "central", false, 0.8),
        ];

        let summary = summarize_by_config(&rows);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].key.n, 20);
        assert_eq!(summary[0].count, 2);
        assert!((summary[0].accuracy_mean - 0.4).abs() < 1e-12);
        assert_eq!(summary[0].accuracy_min, 0.3);
        assert_eq!(summary[0].accuracy_max, 0.5);
        assert_eq!(summary[1].key.n, 10);
        assert_eq!(summary[1].key.placement, "random");
        assert_eq!(summary[2].key.placement, "central");
    }

    #[test]
    fn best_and_worst_break_ties_by_first_occurrence() {
        let rows = vec![
            row(10, "a", false, 0.4),
            row(20, "b", false, 0.4),
            row(30, "c", false, 0.9),
            row(40, "d", false, 0.9),
        ];

        let (best, worst) = best_and_worst_privacy(&rows).unwrap();
        assert_eq!(best.n, 10);
        assert_eq!(worst.n, 30);
        assert!(best_and_worst_privacy(&[]).is_none());
    }

    #[test]
    fn benefit_is_undefined_without_cover_rows() {
        let rows = vec![row(10, "a", false, 0.9)];
        assert_eq!(cover_traffic_benefit(&rows), None);
        assert_eq!(cover_traffic_overhead(&rows), None);
    }

    #[test]
    fn benefit_matches_reference_scenario() {
        let rows = vec![
            row(10, "a", false, 0.9),
            row(10, "a", true, 0.4),
            row(20, "a", true, 0.5),
        ];

        let benefit = cover_traffic_benefit(&rows).unwrap();
        assert!((benefit - 0.45).abs() < 1e-12);

        let overhead = cover_traffic_overhead(&rows).unwrap();
        assert!((overhead - 0.4).abs() < 1e-12);
    }

    #[test]
    fn benefit_tolerates_missing_no_cover_side() {
        let rows = vec![row(10, "a", true, 0.4)];
        let benefit = cover_traffic_benefit(&rows).unwrap();
        assert!((benefit - (-0.4)).abs() < 1e-12);
    }

    #[test]
    fn overall_stats_cover_benefit_defaults_to_zero() {
        let rows = vec![row(10, "a", false, 0.9), row(20, "a", false, 0.7)];
        let overall = overall_stats(2, &rows);
        assert_eq!(overall.total_experiments, 2);
        assert_eq!(overall.seeds_analyzed, 2);
        assert_eq!(overall.cover_traffic_benefit, 0.0);
    }
}
