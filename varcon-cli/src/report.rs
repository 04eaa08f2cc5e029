use anyhow::Result;
use log::info;
use serde::Serialize;

///
/// Log the counts a stage returned, as one JSON line.
///
pub fn log_report<T: Serialize>(stage: &str, report: &T) -> Result<()> {
    info!("{} report: {}", stage, serde_json::to_string(report)?);
    Ok(())
}
