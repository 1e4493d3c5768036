use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "TRANSCRIPTS";

/// Runtime settings: built-in defaults, then `TRANSCRIPTS_*` env vars, then CLI flags.
#[derive(Debug, PartialEq, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub report_file: String,
    pub data_file: String,
    pub languages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: PathBuf::from("research/videos"),
            report_file: "transcript-analysis.md".into(),
            data_file: "insights-data.json".into(),
            languages: vec!["en".into()],
        }
    }
}

/// Command-line overrides; `None`/empty leaves the lower layer in place.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub report_file: Option<String>,
    pub data_file: Option<String>,
    pub languages: Vec<String>,
}

impl Settings {
    pub fn load(overrides: Overrides) -> Result<Self> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX), overrides)
    }

    fn from_env(env: Environment, overrides: Overrides) -> Result<Self> {
        let defaults = Settings::default();
        let mut settings: Settings = Config::builder()
            .set_default("output_dir", defaults.output_dir.to_string_lossy().into_owned())?
            .set_default("report_file", defaults.report_file)?
            .set_default("data_file", defaults.data_file)?
            .set_default("languages", defaults.languages)?
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("languages"),
            )
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if let Some(dir) = overrides.output_dir {
            settings.output_dir = dir;
        }
        if let Some(name) = overrides.report_file {
            settings.report_file = name;
        }
        if let Some(name) = overrides.data_file {
            settings.data_file = name;
        }
        if !overrides.languages.is_empty() {
            settings.languages = overrides.languages;
        }
        Ok(settings)
    }
}

// ── Tests ──
