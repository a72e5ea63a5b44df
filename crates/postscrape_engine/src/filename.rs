use chrono::{DateTime, Local};

pub const OUTPUT_PREFIX: &str = "linkedin_posts";

/// `linkedin_posts_YYYYMMDD_HHMMSS.csv` for the given local time.
pub fn timestamped_filename(at: DateTime<Local>) -> String {
    format!("{OUTPUT_PREFIX}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}
