use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]").unwrap());

const MIN_SENTENCE_CHARS: usize = 20;

const IMPLEMENTATION_KEYWORDS: &[&str] = &[
    "setup", "initialize", "create", "implement", "code", "function", "class", "method",
];
const PERFORMANCE_KEYWORDS: &[&str] = &[
    "optimize", "performance", "fps", "frame rate", "latency", "speed", "fast", "efficient",
];
const GAME_KEYWORDS: &[&str] = &[
    "game", "score", "player", "collision", "physics", "movement", "control", "input",
];
const ISSUE_KEYWORDS: &[&str] = &[
    "problem", "issue", "error", "fix", "solution", "debug", "troubleshoot", "careful",
];
const CODE_MARKERS: &[&str] = &["const ", "let ", "function ", "var "];

/// Classification result for one video. Field order is the JSON key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub title: String,
    pub implementation_patterns: Vec<String>,
    pub performance_tips: Vec<String>,
    pub game_mechanics: Vec<String>,
    pub common_issues: Vec<String>,
    pub code_snippets: Vec<String>,
    pub video_id: String,
    pub transcript_length: usize,
}

impl InsightRecord {
    /// Attach the video id and segment count after classification.
    pub fn with_source(mut self, video_id: &str, segments: usize) -> Self {
        self.video_id = video_id.to_string();
        self.transcript_length = segments;
        self
    }

    pub fn sentences(&self, category: Category) -> &[String] {
        match category {
            Category::Implementation => &self.implementation_patterns,
            Category::Performance => &self.performance_tips,
            Category::GameMechanics => &self.game_mechanics,
            Category::Issues => &self.common_issues,
        }
    }

    fn sentences_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Implementation => &mut self.implementation_patterns,
            Category::Performance => &mut self.performance_tips,
            Category::GameMechanics => &mut self.game_mechanics,
            Category::Issues => &mut self.common_issues,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Category {
    Implementation,
    Performance,
    GameMechanics,
    Issues,
}

impl Category {
    /// Report order.
    pub const ALL: [Category; 4] = [
        Category::Implementation,
        Category::Performance,
        Category::GameMechanics,
        Category::Issues,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Implementation => IMPLEMENTATION_KEYWORDS,
            Category::Performance => PERFORMANCE_KEYWORDS,
            Category::GameMechanics => GAME_KEYWORDS,
            Category::Issues => ISSUE_KEYWORDS,
        }
    }

    /// Substring match, not whole-word: "fast" also hits "breakfast".
    fn matches(self, lowered: &str) -> bool {
        self.keywords().iter().any(|k| lowered.contains(k))
    }
}

/// Split transcript text into sentences and bucket them by keyword category.
///
/// A sentence may land in several categories. Category entries need more than
/// 20 characters after trimming; code snippets only need a declaration marker.
pub fn classify(text: &str, title: &str) -> InsightRecord {
    let mut record = InsightRecord {
        title: title.to_string(),
        ..Default::default()
    };

    for sentence in SENTENCE_END_RE.split(text) {
        let trimmed = sentence.trim();
        let lowered = trimmed.to_lowercase();
        let long_enough = trimmed.chars().count() > MIN_SENTENCE_CHARS;

        for category in Category::ALL {
            if long_enough && category.matches(&lowered) {
                record.sentences_mut(category).push(trimmed.to_string());
            }
        }

        if CODE_MARKERS.iter().any(|m| sentence.contains(m)) {
            record.code_snippets.push(trimmed.to_string());
        }
    }

    record
}

// ── Tests ──
