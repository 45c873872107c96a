//! Result files written by the experiment runner.
//!
//! Every experiment gets its own directory under `simulator/results/` with a
//! `data/` subdirectory for JSON payloads and exported graphs.

use std::fs;

use chrono::Utc;

use crate::logging;

/// Returns the moment of saving as an RFC 3339 timestamp for embedding in
/// result payloads.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Saves `payload` pretty-printed as
/// `simulator/results/<experiment>/data/<file_stem>.json`.
pub fn save_json(
    experiment: &str,
    file_stem: &str,
    payload: &serde_json::Value,
) -> Result<(), String> {
    let directory = format!("simulator/results/{}/data", experiment);
    fs::create_dir_all(&directory).map_err(|e| format!("Failed to create {}: {}", directory, e))?;

    let path = format!("{}/{}.json", directory, file_stem);
    let rendered =
        serde_json::to_string_pretty(payload).map_err(|e| format!("Failed to serialize: {}", e))?;
    fs::write(&path, rendered).map_err(|e| e.to_string())?;

    logging::log("SIMULATOR", &format!("Saved {} to {}", file_stem, path));
    Ok(())
}

/// Saves plain text (stats blocks, GraphML graphs) as
/// `simulator/results/<experiment>/data/<file_name>`.
pub fn save_text(experiment: &str, file_name: &str, contents: &str) -> Result<(), String> {
    let directory = format!("simulator/results/{}/data", experiment);
    fs::create_dir_all(&directory).map_err(|e| format!("Failed to create {}: {}", directory, e))?;

    let path = format!("{}/{}", directory, file_name);
    fs::write(&path, contents).map_err(|e| e.to_string())?;

    logging::log("SIMULATOR", &format!("Saved {} to {}", file_name, path));
    Ok(())
}
