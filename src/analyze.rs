use std::io::{self, Write};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::catalog::CatalogEntry;
use crate::classify::{classify, InsightRecord};
use crate::transcript::{covered_seconds, format_text, TranscriptSource};

/// Fetch and classify every catalog entry, one after another.
///
/// A failed fetch is reported and skipped; it never aborts the run or leaves a
/// partial record behind.
pub async fn analyze_catalog<S: TranscriptSource>(
    source: &S,
    catalog: &[CatalogEntry],
    languages: &[String],
) -> Result<Vec<InsightRecord>> {
    analyze_catalog_to(source, catalog, languages, &mut io::stdout()).await
}

/// Same loop, with console lines written to `out` instead of stdout.
async fn analyze_catalog_to<S: TranscriptSource, W: Write>(
    source: &S,
    catalog: &[CatalogEntry],
    languages: &[String],
    out: &mut W,
) -> Result<Vec<InsightRecord>> {
    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    say(&pb, out, "🎥 Analyzing YouTube videos about pose detection gaming...\n")?;

    let mut records = Vec::with_capacity(catalog.len());
    for entry in catalog {
        pb.set_message(entry.video_id);
        say(
            &pb,
            out,
            &format!("📹 Analyzing: {} (ID: {})", entry.title, entry.video_id),
        )?;

        match source.fetch(entry.video_id, languages).await {
            Ok(segments) => {
                let text = format_text(&segments);
                let record = classify(&text, entry.title).with_source(entry.video_id, segments.len());
                info!(
                    video_id = entry.video_id,
                    segments = segments.len(),
                    seconds = covered_seconds(&segments),
                    patterns = record.implementation_patterns.len(),
                    tips = record.performance_tips.len(),
                    mechanics = record.game_mechanics.len(),
                    issues = record.common_issues.len(),
                    "Analyzed video"
                );
                say(&pb, out, &summary_lines(&record))?;
                records.push(record);
            }
            Err(e) => {
                warn!(video_id = entry.video_id, title = entry.title, error = %e, "Skipping video");
                say(&pb, out, &format!("   ❌ Error: {}\n", e))?;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(records)
}

/// Print above the bar; still reaches `out` when the bar is hidden.
fn say<W: Write>(pb: &ProgressBar, out: &mut W, line: &str) -> io::Result<()> {
    pb.suspend(|| writeln!(out, "{line}"))
}

fn summary_lines(r: &InsightRecord) -> String {
    format!(
        "   ✅ Extracted {} implementation patterns\n   \
         ✅ Found {} performance tips\n   \
         ✅ Identified {} game mechanics\n   \
         ✅ Discovered {} common issues\n",
        r.implementation_patterns.len(),
        r.performance_tips.len(),
        r.game_mechanics.len(),
        r.common_issues.len(),
    )
}

// ── Tests ──
