mod analyze;
mod catalog;
mod classify;
mod output;
mod report;
mod settings;
mod transcript;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use settings::{Overrides, Settings};
use transcript::youtube::YouTubeClient;

#[derive(Parser)]
#[command(
    name = "transcript_insights",
    about = "Mine pose detection gaming tutorials on YouTube for implementation insights"
)]
struct Cli {
    /// Directory for the markdown report and JSON dump
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Preferred transcript language, in order (repeatable)
    #[arg(short = 'l', long = "lang")]
    languages: Vec<String>,
    /// Markdown report file name
    #[arg(long)]
    report_file: Option<String>,
    /// JSON dump file name
    #[arg(long)]
    data_file: Option<String>,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Overrides {
            output_dir: cli.output_dir,
            report_file: cli.report_file,
            data_file: cli.data_file,
            languages: cli.languages,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let settings = Settings::load(Cli::parse().into())?;
    info!(settings = ?settings, "Starting transcript analysis");

    let client = YouTubeClient::new();
    let records =
        analyze::analyze_catalog(&client, catalog::VIDEO_CATALOG, &settings.languages).await?;
    println!(
        "Analyzed {} of {} videos",
        records.len(),
        catalog::VIDEO_CATALOG.len()
    );

    let markdown = report::build_report(&records);
    let report_path = output::write_report(&settings.output_dir, &settings.report_file, &markdown)?;
    output::write_insights(&settings.output_dir, &settings.data_file, &records)?;

    println!(
        "\n✅ Analysis complete! Check {} for the full report.",
        report_path.display()
    );
    info!(elapsed_secs = t0.elapsed().as_secs_f64(), "Done");
    Ok(())
}
