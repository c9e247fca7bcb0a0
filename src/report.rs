use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{OverallStats, ProjectedRow, SeedStats, SummaryRow};
use crate::util::round3;

const RAW_COLUMNS: [&str; 23] = [
    "N",
    "Hmax",
    "obs_count",
    "placement",
    "cover_enabled",
    "poison_rate",
    "accuracy",
    "total_guesses",
    "correct_guesses",
    "total_messages",
    "dummy_messages",
    "dummy_fraction",
    "graph_precision",
    "graph_recall",
    "graph_f1",
    "estimated_nodes",
    "estimated_edges",
    "avg_confidence",
    "total_replies",
    "avg_reply_delay",
    "conversation_threads",
    "avg_path_length",
    "path_diversity",
];

const DETAIL_COLUMNS: [&str; 14] = [
    "N",
    "Hmax",
    "obs_count",
    "placement",
    "cover_enabled",
    "accuracy",
    "graph_f1",
    "graph_precision",
    "graph_recall",
    "dummy_fraction",
    "avg_path_length",
    "path_diversity",
    "total_replies",
    "conversation_threads",
];

/// Rows for the detail exports: fixed column subset, sorted by
/// (N ascending, accuracy ascending).
pub fn detail_rows(rows: &[ProjectedRow]) -> Vec<&ProjectedRow> {
    let mut sorted: Vec<&ProjectedRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.n.cmp(&b.n).then(a.accuracy.total_cmp(&b.accuracy)));
    sorted
}

fn raw_fields(row: &ProjectedRow) -> Vec<String> {
    vec![
        row.n.to_string(),
        row.hmax.to_string(),
        row.obs_count.to_string(),
        row.placement.clone(),
        row.cover_enabled.to_string(),
        row.poison_rate.to_string(),
        row.accuracy.to_string(),
        row.total_guesses.to_string(),
        row.correct_guesses.to_string(),
        row.total_messages.to_string(),
        row.dummy_messages.to_string(),
        row.dummy_fraction.to_string(),
        row.graph_precision.to_string(),
        row.graph_recall.to_string(),
        row.graph_f1.to_string(),
        row.estimated_nodes.to_string(),
        row.estimated_edges.to_string(),
        row.avg_confidence.to_string(),
        row.total_replies.to_string(),
        row.avg_reply_delay.to_string(),
        row.conversation_threads.to_string(),
        row.avg_path_length.to_string(),
        row.path_diversity.to_string(),
    ]
}

fn detail_fields(row: &ProjectedRow) -> Vec<String> {
    vec![
        row.n.to_string(),
        row.hmax.to_string(),
        row.obs_count.to_string(),
        row.placement.clone(),
        row.cover_enabled.to_string(),
        format!("{:.3}", round3(row.accuracy)),
        format!("{:.3}", round3(row.graph_f1)),
        format!("{:.3}", round3(row.graph_precision)),
        format!("{:.3}", round3(row.graph_recall)),
        format!("{:.3}", round3(row.dummy_fraction)),
        format!("{:.3}", round3(row.avg_path_length)),
        format!("{:.3}", round3(row.path_diversity)),
        row.total_replies.to_string(),
        row.conversation_threads.to_string(),
    ]
}

/// Full projected table, one row per experiment, full float precision.
pub fn write_raw_csv(path: &Path, rows: &[ProjectedRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(RAW_COLUMNS)?;
    for row in rows {
        writer.write_record(raw_fields(row))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Cross-seed table: every projected row stamped with its seed.
pub fn write_combined_csv(path: &Path, rows: &[(String, ProjectedRow)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["seed"];
    header.extend(RAW_COLUMNS);
    writer.write_record(header)?;

    for (seed, row) in rows {
        let mut fields = vec![seed.clone()];
        fields.extend(raw_fields(row));
        writer.write_record(fields)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_summary_csv(path: &Path, summary: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "N",
        "placement",
        "cover_enabled",
        "count",
        "accuracy_mean",
        "accuracy_std",
        "accuracy_min",
        "accuracy_max",
        "graph_f1_mean",
        "graph_f1_std",
        "dummy_fraction_mean",
        "total_messages_mean",
    ])?;

    for row in summary {
        writer.write_record([
            row.key.n.to_string(),
            row.key.placement.clone(),
            row.key.cover_enabled.to_string(),
            row.count.to_string(),
            format!("{:.3}", row.accuracy_mean),
            format!("{:.3}", row.accuracy_std),
            format!("{:.3}", row.accuracy_min),
            format!("{:.3}", row.accuracy_max),
            format!("{:.3}", row.graph_f1_mean),
            format!("{:.3}", row.graph_f1_std),
            format!("{:.3}", row.dummy_fraction_mean),
            format!("{:.3}", row.total_messages_mean),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_detail_csv(path: &Path, sorted: &[&ProjectedRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(DETAIL_COLUMNS)?;
    for row in sorted {
        writer.write_record(detail_fields(row))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// LaTeX fragment of the first 20 detail rows, captioned and labeled by
/// seed, for inclusion in a paper.
pub fn write_latex_table(path: &Path, sorted: &[&ProjectedRow], seed: &str) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "\\begin{{table}}")?;
    writeln!(out, "\\caption{{Experimental Results for Seed {seed}}}")?;
    writeln!(out, "\\label{{tab:results_seed_{seed}}}")?;
    writeln!(out, "\\begin{{tabular}}{{{}}}", "l".repeat(DETAIL_COLUMNS.len()))?;
    writeln!(out, "\\toprule")?;
    writeln!(out, "{} \\\\", DETAIL_COLUMNS.join(" & "))?;
    writeln!(out, "\\midrule")?;

    for row in sorted.iter().take(20) {
        writeln!(out, "{} \\\\", detail_fields(row).join(" & "))?;
    }

    writeln!(out, "\\bottomrule")?;
    writeln!(out, "\\end{{tabular}}")?;
    writeln!(out, "\\end{{table}}")?;

    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Human-readable per-seed report: the grouped statistics plus the
/// best/worst-privacy narrative and the cover-traffic lines.
pub fn write_summary_report(
    path: &Path,
    seed: &str,
    summary: &[SummaryRow],
    best_worst: Option<(&ProjectedRow, &ProjectedRow)>,
    benefit: Option<f64>,
    overhead: Option<f64>,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Summary Statistics for Seed {seed}")?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out)?;

    writeln!(
        out,
        "{:>6} {:<14} {:>6} {:>6} {:>9} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "N",
        "placement",
        "cover",
        "count",
        "acc_mean",
        "acc_std",
        "acc_min",
        "acc_max",
        "f1_mean",
        "f1_std",
        "dummy_mean",
        "msgs_mean"
    )?;
    for row in summary {
        writeln!(
            out,
            "{:>6} {:<14} {:>6} {:>6} {:>9.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>10.3} {:>10.3}",
            row.key.n,
            row.key.placement,
            row.key.cover_enabled,
            row.count,
            row.accuracy_mean,
            row.accuracy_std,
            row.accuracy_min,
            row.accuracy_max,
            row.graph_f1_mean,
            row.graph_f1_std,
            row.dummy_fraction_mean,
            row.total_messages_mean
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Key Insights:")?;
    writeln!(out, "{}", "-".repeat(40))?;

    match best_worst {
        Some((best, worst)) => {
            writeln!(out, "Best Privacy (Lowest Accuracy): {:.3}", best.accuracy)?;
            writeln!(
                out,
                "  Configuration: N={}, Placement={}, Cover={}",
                best.n,
                best.placement,
                if best.cover_enabled { "Yes" } else { "No" }
            )?;
            writeln!(out)?;
            writeln!(out, "Worst Privacy (Highest Accuracy): {:.3}", worst.accuracy)?;
            writeln!(
                out,
                "  Configuration: N={}, Placement={}, Cover={}",
                worst.n,
                worst.placement,
                if worst.cover_enabled { "Yes" } else { "No" }
            )?;
            writeln!(out)?;
        }
        None => {
            writeln!(out, "No data for seed {seed}")?;
            writeln!(out)?;
        }
    }

    if let Some(benefit) = benefit {
        writeln!(
            out,
            "Average Privacy Improvement from Cover Traffic: {benefit:.3}"
        )?;
    }
    if let Some(overhead) = overhead {
        writeln!(
            out,
            "Average Cover Traffic Overhead: {:.1}%",
            overhead * 100.0
        )?;
    }

    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Corpus-wide scalar report, 4-decimal float formatting.
pub fn write_overall_report(
    path: &Path,
    overall: &OverallStats,
    per_seed: &[SeedStats],
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Overall Experiment Statistics")?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out)?;
    writeln!(out, "Total Experiments: {}", overall.total_experiments)?;
    writeln!(out, "Seeds Analyzed: {}", overall.seeds_analyzed)?;
    writeln!(out, "Mean Accuracy: {:.4}", overall.accuracy_mean)?;
    writeln!(out, "Std Accuracy: {:.4}", overall.accuracy_std)?;
    writeln!(out, "Mean Graph F1: {:.4}", overall.graph_f1_mean)?;
    writeln!(out, "Std Graph F1: {:.4}", overall.graph_f1_std)?;
    writeln!(
        out,
        "Cover Traffic Benefit: {:.4}",
        overall.cover_traffic_benefit
    )?;
    writeln!(out)?;

    writeln!(out, "Per-Seed Statistics")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for stats in per_seed {
        writeln!(
            out,
            "seed {}: runs={} accuracy={:.4}±{:.4} graph_f1={:.4}±{:.4}",
            stats.seed,
            stats.count,
            stats.accuracy_mean,
            stats.accuracy_std,
            stats.graph_f1_mean,
            stats.graph_f1_std
        )?;
    }

    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u64, accuracy: f64) -> ProjectedRow {
        ProjectedRow {
            n,
            hmax: 3,
            obs_count: 1,
            placement: "random".to_string(),
            cover_enabled: false,
            poison_rate: 0.0,
            accuracy,
            total_guesses: 0,
            correct_guesses: 0,
            total_messages: 0,
            dummy_messages: 0,
            dummy_fraction: 0.0,
            graph_precision: 0.123_456,
            graph_recall: 0.0,
            graph_f1: 0.0,
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
    fn detail_rows_sort_by_n_then_accuracy() {
        let rows = vec![row(20, 0.1), row(10, 0.9), row(10, 0.2)];
        let sorted = detail_rows(&rows);
        assert_eq!(sorted[0].n, 10);
        assert_eq!(sorted[0].accuracy, 0.2);
        assert_eq!(sorted[1].accuracy, 0.9);
        assert_eq!(sorted[2].n, 20);
    }

    #[test]
    fn detail_fields_round_to_three_decimals() {
        let fields = detail_fields(&row(10, 0.123_456));
        assert_eq!(fields[5], "0.123");
        assert_eq!(fields[7], "0.123");
    }

    #[test]
    fn latex_table_truncates_to_twenty_rows() {
        let rows: Vec<ProjectedRow> = (0..30).map(|i| row(i, 0.5)).collect();
        let sorted = detail_rows(&rows);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results_table.tex");
        write_latex_table(&path, &sorted, "1").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\\caption{Experimental Results for Seed 1}"));
        assert!(text.contains("\\label{tab:results_seed_1}"));
        let data_lines = text.lines().filter(|l| l.ends_with("\\\\")).count();
        // header line plus 20 data rows
        assert_eq!(data_lines, 21);
    }

    #[test]
    fn summary_report_mentions_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_table.txt");
        write_summary_report(&path, "9", &[], None, None, None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("No data for seed 9"));
        assert!(!text.contains("Cover Traffic Overhead"));
    }
}
