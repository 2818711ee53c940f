//! Reference data loading
//!
//! Reads the `;`-separated annotation and phase-label CSVs and joins them
//! into the boundary rows the timeline table is built from. Runs once at
//! startup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PhaseServerError, Result};
use crate::timeline::{PhaseBoundary, TimelineTable};

/// One row of `annotations.csv`
#[derive(Debug, Deserialize)]
struct AnnotationRow {
    #[serde(rename = "VideoID")]
    video_id: i64,
    #[serde(rename = "FrameNo")]
    frame: u64,
    #[serde(rename = "Phase")]
    phase: u32,
}

/// One row of `phases.csv`
#[derive(Debug, Deserialize)]
struct PhaseRow {
    #[serde(rename = "Phase")]
    phase: u32,
    #[serde(rename = "Meaning")]
    meaning: String,
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(PhaseServerError::from)
}

/// Load both CSVs and join annotations with their phase labels.
///
/// Every annotation row must reference a phase id present in the label
/// table; a dangling reference aborts startup rather than serving a
/// half-labeled catalogue.
pub fn load_timeline<P: AsRef<Path>>(annotations_path: P, phases_path: P) -> Result<TimelineTable> {
    let mut labels: HashMap<u32, String> = HashMap::new();
    for record in reader(phases_path.as_ref())?.deserialize() {
        let row: PhaseRow = record?;
        labels.insert(row.phase, row.meaning);
    }

    let mut boundaries = Vec::new();
    for record in reader(annotations_path.as_ref())?.deserialize() {
        let row: AnnotationRow = record?;
        let label = labels
            .get(&row.phase)
            .ok_or(PhaseServerError::UnknownPhase(row.phase))?;
        boundaries.push(PhaseBoundary {
            video_id: row.video_id,
            frame: row.frame,
            phase_id: row.phase,
            label: label.clone(),
        });
    }

    tracing::info!(
        rows = boundaries.len(),
        labels = labels.len(),
        "timeline reference data loaded"
    );

    Ok(TimelineTable::from_boundaries(boundaries))
}
