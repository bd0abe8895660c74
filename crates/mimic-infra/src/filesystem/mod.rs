//! Filesystem helpers: data directory resolution and training corpora.

use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "MIMIC_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `MIMIC_DATA_DIR` environment variable
/// 2. `~/.mimic`
/// 3. `.mimic` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".mimic");
    }

    PathBuf::from(".mimic")
}

/// Read a training corpus: one sample per line, blank lines skipped.
pub async fn read_samples(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
