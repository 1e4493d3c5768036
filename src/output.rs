use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::classify::InsightRecord;

/// Write the markdown report under `dir`, creating the directory if needed.
pub fn write_report(dir: &Path, file_name: &str, markdown: &str) -> Result<PathBuf> {
    write_file(dir, file_name, markdown)
}

/// Dump the raw records as a 2-space indented JSON array.
pub fn write_insights(dir: &Path, file_name: &str, records: &[InsightRecord]) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize insights")?;
    write_file(dir, file_name, &json)
}

fn write_file(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(path)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn demo_record() -> InsightRecord {
        classify(
            "We need to optimize performance for the game. let x = 1. Initialize the player position carefully.",
            "Demo",
        )
        .with_source("abc", 12)
    }

    #[test]
    fn json_has_expected_keys_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_insights(dir.path(), "insights-data.json", &[demo_record()]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();

        let keys = [
            "\"title\"",
            "\"implementation_patterns\"",
            "\"performance_tips\"",
            "\"game_mechanics\"",
            "\"common_issues\"",
            "\"code_snippets\"",
            "\"video_id\"",
            "\"transcript_length\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| raw.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(raw.starts_with("[\n  {\n    \"title\": \"Demo\""));
        assert!(raw.contains("\"transcript_length\": 12"));
    }

    #[test]
    fn json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let original = vec![demo_record(), classify("", "Empty").with_source("e", 0)];
        let path = write_insights(dir.path(), "data.json", &original).unwrap();

        let parsed: Vec<InsightRecord> =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed[0].code_snippets, vec!["let x = 1"]);
    }

    #[test]
    fn empty_records_write_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_insights(dir.path(), "data.json", &[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn report_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("research").join("videos");
        let path = write_report(&nested, "transcript-analysis.md", "# hi\n").unwrap();
        assert_eq!(path, nested.join("transcript-analysis.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "# hi\n");
    }

    #[test]
    fn write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let err = write_report(&blocker, "r.md", "# hi").unwrap_err();
        assert!(err.to_string().contains("Failed to create output directory"));
    }
}
