use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::charts::{self, ChartStyle};
use crate::loader;
use crate::model::{AnalysisManifest, ProjectedRow, SeedManifestEntry};
use crate::project;
use crate::report;
use crate::stats;
use crate::util::{ensure_directory, now_utc_string, write_json_pretty};

/// Runs the whole pipeline: load, group by seed, analyze each seed, then
/// the combined cross-seed aggregation.
pub fn run(input_dir: &Path, output_dir: &Path) -> Result<()> {
    if !input_dir.is_dir() {
        warn!(input_dir = %input_dir.display(), "input directory not found, nothing to analyze");
        return Ok(());
    }

    let (records, skipped) = loader::load_records(input_dir)?;
    if records.is_empty() {
        warn!(input_dir = %input_dir.display(), "no result documents found, nothing to analyze");
        return Ok(());
    }
    let records_loaded = records.len();

    ensure_directory(output_dir)?;

    let groups = project::group_by_seed(records);
    info!(seeds = groups.len(), "grouped experiments by seed");

    let style = ChartStyle::default();
    let mut seed_tables: Vec<(String, Vec<ProjectedRow>)> = Vec::new();

    for (seed, group) in &groups {
        info!(seed = %seed, experiments = group.len(), "analyzing seed");
        let rows: Vec<ProjectedRow> = group.iter().map(ProjectedRow::from_record).collect();
        analyze_seed(output_dir, seed, &rows, &style)?;
        seed_tables.push((seed.clone(), rows));
    }

    combined_analysis(output_dir, &seed_tables, &style)?;

    let manifest = AnalysisManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        input_dir: input_dir.display().to_string(),
        output_dir: output_dir.display().to_string(),
        records_loaded,
        sources_skipped: skipped,
        seed_count: seed_tables.len(),
        seeds: seed_tables
            .iter()
            .map(|(seed, rows)| SeedManifestEntry {
                seed: seed.clone(),
                record_count: rows.len(),
            })
            .collect(),
    };
    let manifest_path = output_dir.join("analysis_manifest.json");
    best_effort("analysis_manifest.json", write_json_pretty(&manifest_path, &manifest));

    info!(output_dir = %output_dir.display(), "analysis complete");
    Ok(())
}

/// Per-seed tables, narrative report, and chart renders. Everything past
/// the seed directory creation is best-effort per artifact.
fn analyze_seed(
    output_dir: &Path,
    seed: &str,
    rows: &[ProjectedRow],
    style: &ChartStyle,
) -> Result<()> {
    let seed_dir = output_dir.join(format!("seed_{seed}"));
    ensure_directory(&seed_dir)?;

    let summary = stats::summarize_by_config(rows);
    let best_worst = stats::best_and_worst_privacy(rows);
    if best_worst.is_none() {
        info!(seed = %seed, "no data for seed");
    }
    let benefit = stats::cover_traffic_benefit(rows);
    let overhead = stats::cover_traffic_overhead(rows);
    let detail = report::detail_rows(rows);

    best_effort("raw_data.csv", report::write_raw_csv(&seed_dir.join("raw_data.csv"), rows));
    best_effort(
        "summary_table.csv",
        report::write_summary_csv(&seed_dir.join("summary_table.csv"), &summary),
    );
    best_effort(
        "summary_table.txt",
        report::write_summary_report(
            &seed_dir.join("summary_table.txt"),
            seed,
            &summary,
            best_worst,
            benefit,
            overhead,
        ),
    );
    best_effort(
        "detailed_metrics.csv",
        report::write_detail_csv(&seed_dir.join("detailed_metrics.csv"), &detail),
    );
    best_effort(
        "results_table.tex",
        report::write_latex_table(&seed_dir.join("results_table.tex"), &detail, seed),
    );

    best_effort(
        "accuracy_vs_n.png",
        charts::accuracy_vs_n(&seed_dir.join("accuracy_vs_n.png"), rows, style, seed),
    );
    best_effort(
        "accuracy_by_placement.png",
        charts::accuracy_by_placement(&seed_dir.join("accuracy_by_placement.png"), rows, style, seed),
    );
    best_effort(
        "cover_traffic_impact.png",
        charts::cover_traffic_impact(&seed_dir.join("cover_traffic_impact.png"), rows, style, seed),
    );
    best_effort(
        "graph_reconstruction.png",
        charts::graph_reconstruction(&seed_dir.join("graph_reconstruction.png"), rows, style, seed),
    );

    let mut hmax_values: Vec<u64> = rows.iter().map(|r| r.hmax).collect();
    hmax_values.sort_unstable();
    hmax_values.dedup();
    if hmax_values.len() > 1 {
        best_effort(
            "hmax_impact.png",
            charts::hmax_impact(&seed_dir.join("hmax_impact.png"), rows, style, seed),
        );
    }

    Ok(())
}

fn combined_analysis(
    output_dir: &Path,
    seed_tables: &[(String, Vec<ProjectedRow>)],
    style: &ChartStyle,
) -> Result<()> {
    let combined_dir = output_dir.join("combined");
    ensure_directory(&combined_dir)?;

    let stamped: Vec<(String, ProjectedRow)> = seed_tables
        .iter()
        .flat_map(|(seed, rows)| rows.iter().map(|row| (seed.clone(), row.clone())))
        .collect();
    let all_rows: Vec<ProjectedRow> = stamped.iter().map(|(_, row)| row.clone()).collect();

    let per_seed = stats::per_seed_stats(seed_tables);
    let overall = stats::overall_stats(seed_tables.len(), &all_rows);

    info!(
        experiments = overall.total_experiments,
        seeds = overall.seeds_analyzed,
        "generating combined analysis"
    );

    best_effort(
        "seed_variation.png",
        charts::seed_variation(&combined_dir.join("seed_variation.png"), &per_seed, style),
    );
    best_effort(
        "overall_statistics.txt",
        report::write_overall_report(&combined_dir.join("overall_statistics.txt"), &overall, &per_seed),
    );
    best_effort(
        "all_results.csv",
        report::write_combined_csv(&combined_dir.join("all_results.csv"), &stamped),
    );

    Ok(())
}

/// A chart or table that cannot be produced is a warning for that artifact
/// only; the rest of the run continues.
fn best_effort(artifact: &str, result: Result<()>) {
    if let Err(err) = result {
        warn!(artifact, error = %err, "failed to produce artifact");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn write_result(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn seed_one_fixture(input: &Path) {
        write_result(
            input,
            "N-10_cover-false_seed-1.json",
            r#"{
                "params": {"seed": "1", "N": 10, "Hmax": 3, "placement": "random", "coverEnabled": false},
                "results": {"accuracy": 0.9, "total": 10, "correct": 9}
            }"#,
        );
        write_result(
            input,
            "N-10_cover-true_seed-1.json",
            r#"{
                "params": {"seed": "1", "N": 10, "Hmax": 3, "placement": "random", "coverEnabled": true},
                "results": {
                    "accuracy": 0.4,
                    "coverTraffic": {"totalMessages": 200, "dummyMessages": 100, "dummyFraction": 0.5}
                }
            }"#,
        );
        write_result(
            input,
            "N-20_cover-true_seed-1.json",
            r#"{
                "params": {"seed": "1", "N": 20, "Hmax": 3, "placement": "random", "coverEnabled": true},
                "results": {
                    "accuracy": 0.5,
                    "coverTraffic": {"totalMessages": 400, "dummyMessages": 120, "dummyFraction": 0.3}
                }
            }"#,
        );
    }

    #[test]
    fn end_to_end_single_seed_scenario() {
        let workspace = tempfile::tempdir().unwrap();
        let input = workspace.path().join("out");
        let output = workspace.path().join("analysis");
        fs::create_dir(&input).unwrap();
        seed_one_fixture(&input);
        // A previously produced aggregate must not be picked up as data.
        write_result(&input, "experiment_summary.json", r#"{"anything": true}"#);

        run(&input, &output).unwrap();

        let seed_dir = output.join("seed_1");
        let summary_csv = fs::read_to_string(seed_dir.join("summary_table.csv")).unwrap();
        // header plus three configuration groups
        assert_eq!(summary_csv.lines().count(), 4);

        let report = fs::read_to_string(seed_dir.join("summary_table.txt")).unwrap();
        assert!(report.contains("Best Privacy (Lowest Accuracy): 0.400"));
        assert!(report.contains("Worst Privacy (Highest Accuracy): 0.900"));
        assert!(report.contains("Average Privacy Improvement from Cover Traffic: 0.450"));
        assert!(report.contains("Average Cover Traffic Overhead: 40.0%"));

        let raw_csv = fs::read_to_string(seed_dir.join("raw_data.csv")).unwrap();
        assert_eq!(raw_csv.lines().count(), 4);

        let combined = fs::read_to_string(output.join("combined").join("all_results.csv")).unwrap();
        assert_eq!(combined.lines().count(), 4);
        assert!(combined.starts_with("seed,"));

        let overall =
            fs::read_to_string(output.join("combined").join("overall_statistics.txt")).unwrap();
        assert!(overall.contains("Total Experiments: 3"));
        assert!(overall.contains("Seeds Analyzed: 1"));
        assert!(overall.contains("Mean Accuracy: 0.6000"));
        assert!(overall.contains("Cover Traffic Benefit: 0.4500"));

        // Hmax never varies in this fixture, so the hop-limit chart is skipped.
        assert!(!seed_dir.join("hmax_impact.png").exists());

        let manifest = fs::read_to_string(output.join("analysis_manifest.json")).unwrap();
        assert!(manifest.contains("\"records_loaded\": 3"));
        assert!(manifest.contains("\"seed_count\": 1"));
    }

    #[test]
    fn records_without_seed_land_in_unknown_group() {
        let workspace = tempfile::tempdir().unwrap();
        let input = workspace.path().join("out");
        let output = workspace.path().join("analysis");
        fs::create_dir(&input).unwrap();
        write_result(
            &input,
            "stray.json",
            r#"{"params": {"N": 10}, "results": {"accuracy": 0.5}}"#,
        );

        run(&input, &output).unwrap();

        assert!(output.join("seed_unknown").join("raw_data.csv").exists());
        let combined = fs::read_to_string(output.join("combined").join("all_results.csv")).unwrap();
        assert!(combined.lines().nth(1).unwrap().starts_with("unknown,"));
    }

    #[test]
    fn tabular_exports_are_idempotent() {
        let workspace = tempfile::tempdir().unwrap();
        let input = workspace.path().join("out");
        let output = workspace.path().join("analysis");
        fs::create_dir(&input).unwrap();
        seed_one_fixture(&input);

        run(&input, &output).unwrap();
        let first_summary = fs::read(output.join("seed_1").join("summary_table.csv")).unwrap();
        let first_combined = fs::read(output.join("combined").join("all_results.csv")).unwrap();

        run(&input, &output).unwrap();
        let second_summary = fs::read(output.join("seed_1").join("summary_table.csv")).unwrap();
        let second_combined = fs::read(output.join("combined").join("all_results.csv")).unwrap();

        assert_eq!(first_summary, second_summary);
        assert_eq!(first_combined, second_combined);
    }

    #[test]
    fn missing_input_directory_is_not_an_error() {
        let workspace = tempfile::tempdir().unwrap();
        let input = workspace.path().join("does-not-exist");
        let output = workspace.path().join("analysis");

        run(&input, &output).unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn malformed_documents_are_skipped_not_fatal() {
        let workspace = tempfile::tempdir().unwrap();
        let input = workspace.path().join("out");
        let output = workspace.path().join("analysis");
        fs::create_dir(&input).unwrap();
        seed_one_fixture(&input);
        write_result(&input, "broken.json", "{never valid");

        run(&input, &output).unwrap();

        let manifest = fs::read_to_string(output.join("analysis_manifest.json")).unwrap();
        assert!(manifest.contains("\"records_loaded\": 3"));
        assert!(manifest.contains("\"sources_skipped\": 1"));
    }
}
