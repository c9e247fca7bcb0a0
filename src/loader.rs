use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::model::RawRecord;

/// Discovers and parses every result document in `input_dir`.
///
/// Returns the parsed records in file-name order plus the number of sources
/// skipped because they could not be read or parsed. A malformed document is
/// never fatal to the load as a whole.
pub fn load_records(input_dir: &Path) -> Result<(Vec<RawRecord>, usize)> {
    let mut paths = discover_documents(input_dir)?;
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    let mut skipped = 0_usize;

    for path in paths {
        match parse_document(&path) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(source = %path.display(), error = %err, "skipping unreadable result document");
                skipped += 1;
            }
        }
    }

    info!(
        input_dir = %input_dir.display(),
        loaded = records.len(),
        skipped,
        "loaded experiment results"
    );

    Ok((records, skipped))
}

fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory: {}", input_dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            continue;
        }

        // A name containing "summary" is a previously produced aggregate,
        // not raw experiment output.
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if name.contains("summary") {
            continue;
        }

        paths.push(path);
    }

    Ok(paths)
}

fn parse_document(path: &Path) -> Result<RawRecord> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let origin_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 file name: {}", path.display()))?;

    let params = document.get("params").cloned().unwrap_or(Value::Null);
    let results = document.get("results").cloned().unwrap_or(Value::Null);
    let name_params = parse_name_params(&origin_name);

    Ok(RawRecord {
        origin_name,
        params,
        results,
        name_params,
    })
}

/// Recovers `key-value` tokens from an origin name such as
/// `N-20_placement-near-sender_seed-3.json`. Only the first `-` in a token
/// separates key from value, so values may themselves contain `-`.
pub fn parse_name_params(origin_name: &str) -> HashMap<String, String> {
    let stem = origin_name.strip_suffix(".json").unwrap_or(origin_name);

    let mut params = HashMap::new();
    for token in stem.split('_') {
        if let Some((key, value)) = token.split_once('-') {
            params.insert(key.to_string(), value.to_string());
        }
    }

    params
}
