//! Exports for external tools.
//!
//! - render outcome (title + path descriptors) as pretty JSON, for a chart
//!   renderer outside this crate
//! - the joined long table as CSV, easy to open in a spreadsheet

use std::fs::File;
use std::path::Path;

use crate::domain::JointTable;
use crate::error::AppError;
use crate::render::RenderOutcome;

/// Write the render outcome as JSON.
pub fn write_outcome_json(path: &Path, outcome: &RenderOutcome) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create JSON export '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, outcome)
        .map_err(|e| AppError::new(2, format!("Failed to write JSON export: {e}")))?;
    Ok(())
}

/// Write the joined table as `date,region,sale,rent` rows.
pub fn write_joint_csv(path: &Path, table: &JointTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV export '{}': {e}", path.display())))?;

    let (sale_col, rent_col) = table.kind.metrics();
    writer
        .write_record(["date", "region", sale_col.as_str(), rent_col.as_str()])
        .map_err(|e| AppError::new(2, format!("Failed to write CSV export header: {e}")))?;

    for r in &table.records {
        writer
            .write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.region.clone(),
                r.sale.to_string(),
                r.rent.to_string(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write CSV export row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV export: {e}")))?;
    Ok(())
}
