/// One video to analyze: YouTube id plus the title shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub video_id: &'static str,
    pub title: &'static str,
}

const fn entry(video_id: &'static str, title: &'static str) -> CatalogEntry {
    CatalogEntry { video_id, title }
}

/// Pose detection gaming tutorials (found through manual search).
pub const VIDEO_CATALOG: &[CatalogEntry] = &[
    // MediaPipe pose detection tutorials
    entry("OhMs-ipk8gE", "MediaPipe Pose Detection in JavaScript"),
    entry("cc0H_sZrOiM", "Google MediaPipe Pose - JavaScript Tutorial"),
    entry("FPD9YnxHJfE", "PoseNet Real-Time Pose Detection"),
    entry("Iy4UQNZklyk", "Build AI Pose Estimation App"),
    entry("9wy7P2GJvhE", "Pose Estimation Game Tutorial"),
    // Game development with pose
    entry("4c0pOJnt994", "Motion Capture Games with JavaScript"),
    entry("pjAihwONJuI", "Gesture Recognition Gaming"),
    // Performance optimization
    entry("6CKjCLfL7FE", "Optimizing MediaPipe Performance"),
    entry("T0kzis7cwJM", "Real-time Computer Vision Optimization"),
];
