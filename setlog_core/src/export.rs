//! CSV export of the workout history.
//!
//! One row per archived session. The export is an escape hatch out of the
//! local store; the engine never reads it back.

use crate::types::WorkoutSession;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    routine_id: String,
    date: String,
    started_at: Option<String>,
    completed_at: Option<String>,
    duration_ms: Option<i64>,
    completed: bool,
    completed_sets: usize,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            routine_id: session.routine_id.clone(),
            date: session.date.to_rfc3339(),
            started_at: session.started_at.map(|t| t.to_rfc3339()),
            completed_at: session.completed_at.map(|t| t.to_rfc3339()),
            duration_ms: session.duration_ms,
            completed: session.completed,
            completed_sets: session.sets_progress.iter().filter(|p| p.completed).count(),
        }
    }
}

/// Write the history to a CSV file, replacing any previous export
///
/// Returns the number of sessions written. The file is flushed and synced
/// before returning.
pub fn export_history(history: &[WorkoutSession], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(csv_path)?;

    let mut writer = csv::Writer::from_writer(file);
    for session in history {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", history.len(), csv_path);
    Ok(history.len())
}
