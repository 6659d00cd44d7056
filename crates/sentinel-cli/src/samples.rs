//! Training samples loaded from a JSON file.

use std::path::Path;

use anyhow::Context;

/// Read a JSON array of numbers, e.g. `[4.0, 5.0, 5.5]`.
pub fn load(path: &Path) -> anyhow::Result<Vec<f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read samples from {}", path.display()))?;
    let samples: Vec<f64> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of numbers", path.display()))?;
    Ok(samples)
}
