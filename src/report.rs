use chrono::{DateTime, Local, TimeZone};
use itertools::Itertools;

use crate::classify::{Category, InsightRecord};

/// Max bullets per aggregated category.
const TOP_N: usize = 10;

const TRAILER: &str = "
## 🔍 Key Takeaways for Our Project

Based on the analysis of these videos, here are the most important insights for our pose detection game:

1. **Use MediaPipe over PoseNet** - Multiple videos emphasize MediaPipe's superior performance
2. **Implement pose smoothing** - Essential for stable gameplay experience
3. **Optimize detection zones** - Focus on specific body parts relevant to game mechanics
4. **Add visual feedback** - Show skeleton overlay and detection confidence
5. **Handle edge cases** - Account for partial visibility and multiple people
6. **Test different lighting** - Pose detection accuracy varies with lighting conditions
7. **Consider mobile performance** - Reduce model complexity for mobile devices
8. **Add calibration phase** - Let players adjust their position before starting
9. **Use confidence thresholds** - Filter out low-confidence detections
10. **Implement gesture debouncing** - Prevent accidental repeated actions

## 📚 Recommended Implementation Order

1. Set up basic MediaPipe pose detection
2. Implement pose landmark visualization
3. Create simple gesture recognition (e.g., hands up)
4. Add game mechanics tied to specific poses
5. Implement score system and feedback
6. Optimize performance and add smoothing
7. Add multiplayer support if needed
8. Polish with effects and sound
";

fn heading(category: Category) -> &'static str {
    match category {
        Category::Implementation => "## 🎯 Key Implementation Patterns",
        Category::Performance => "## ⚡ Performance Optimization Tips",
        Category::GameMechanics => "## 🎮 Game Mechanics Insights",
        Category::Issues => "## ⚠️ Common Issues and Solutions",
    }
}

/// Render the markdown report, stamped with the current local time.
pub fn build_report(records: &[InsightRecord]) -> String {
    build_report_at(records, Local::now())
}

pub fn build_report_at<Tz: TimeZone>(records: &[InsightRecord], generated: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    out.push_str("# YouTube Video Analysis: Pose Detection Gaming\n");
    out.push_str(&format!(
        "*Generated on {}*\n\n",
        generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("## 📊 Analysis Summary\n\n");
    out.push_str(&format!(
        "Analyzed {} videos about pose detection in gaming applications.\n",
        records.len()
    ));

    for category in Category::ALL {
        out.push_str(&format!("\n{}\n\n", heading(category)));
        for sentence in top_unique(records, category) {
            out.push_str(&format!("- {}\n", sentence));
        }
    }

    out.push_str("\n## 📹 Video Summaries\n\n");
    for r in records {
        out.push_str(&format!("### {}\n", r.title));
        out.push_str(&format!("- **Video ID**: {}\n", r.video_id));
        out.push_str(&format!(
            "- **Transcript Length**: {} segments\n",
            r.transcript_length
        ));
        out.push_str(&format!(
            "- **Key Insights**: {} patterns, {} tips, {} mechanics\n\n",
            r.implementation_patterns.len(),
            r.performance_tips.len(),
            r.game_mechanics.len()
        ));
    }

    out.push_str(TRAILER);
    out
}

/// Pool one category across all records, dedup by first occurrence, keep `TOP_N`.
pub fn top_unique(records: &[InsightRecord], category: Category) -> Vec<&str> {
    records
        .iter()
        .flat_map(|r| r.sentences(category))
        .map(String::as_str)
        .unique()
        .take(TOP_N)
        .collect()
}

// ── Tests ──
