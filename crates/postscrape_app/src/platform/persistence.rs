use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use engine_logging::{engine_info, engine_warn};
use postscrape_engine::SelectorConfig;

/// Selector overrides from a RON file.
///
/// A missing file means the built-in selectors; an unreadable or malformed
/// file is reported and also falls back to them.
pub(crate) fn load_selectors(path: &Path) -> SelectorConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return SelectorConfig::default();
        }
        Err(err) => {
            engine_warn!("Failed to read selector overrides from {:?}: {}", path, err);
            return SelectorConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(selectors) => {
            engine_info!("Loaded selector overrides from {:?}", path);
            selectors
        }
        Err(err) => {
            engine_warn!("Failed to parse selector overrides from {:?}: {}", path, err);
            SelectorConfig::default()
        }
    }
}
