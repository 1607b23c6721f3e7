// Run output handling: the per-generation history CSV and rendered
// schedule files.

use std::fs;
use std::path::Path;

use csv::Writer;

use crate::error::Error;
use crate::evolution::GenerationRecord;

pub fn ensure_output_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Writes the history as CSV, one row per generation plus a trailing row
/// carrying the wall-clock time of the whole run.
pub fn write_history(
    path: &Path,
    history: &[GenerationRecord],
    total_seconds: f64,
) -> Result<(), Error> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "generation",
        "best_time",
        "average_time",
        "Pc",
        "Pm",
        "reward",
    ])?;
    for record in history {
        writer.write_record([
            record.generation.to_string(),
            record.best_time.to_string(),
            record.average_time.to_string(),
            record.pc.to_string(),
            record.pm.to_string(),
            record.reward.to_string(),
        ])?;
    }
    writer.write_record([
        "Total Time".to_string(),
        format!("{total_seconds:.2}"),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ])?;
    writer.flush()?;
    Ok(())
}

pub fn write_svg(path: &Path, chart: &str) -> Result<(), Error> {
    fs::write(path, chart)?;
    Ok(())
}
