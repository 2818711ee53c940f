//! Procedure timeline data and lookup
//!
//! Holds the per-video sequences of phase boundaries, built once at startup
//! and read-only afterwards, plus the point-in-time snapshot query that
//! backs the `/info` endpoint.

pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceGenerator;
use crate::error::{PhaseServerError, Result};

/// Frame rate the recordings are annotated at.
pub const FRAME_RATE: f64 = 25.0;

/// One phase boundary: the frame at which a phase begins in a given video.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBoundary {
    pub video_id: i64,
    pub frame: u64,
    pub phase_id: u32,
    pub label: String,
}

impl PhaseBoundary {
    /// Display form used both in the phase catalogue and as the current
    /// phase marker, e.g. `"P2 - Calot triangle dissection"`.
    pub fn display(&self) -> String {
        format!("P{} - {}", self.phase_id, self.label)
    }
}

/// Static clinical record echoed verbatim in every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "BMI")]
    pub bmi: u32,
    #[serde(rename = "Date")]
    pub date: String,
}

impl Default for ClinicalInfo {
    fn default() -> Self {
        Self {
            id: "230236XX".to_string(),
            age: 36,
            bmi: 27,
            date: "2025-11-01".to_string(),
        }
    }
}

/// Overlay snapshot for one (video, frame) query
#[derive(Debug, Clone, Serialize)]
pub struct TimelineSnapshot {
    pub procedure: String,
    pub phases: Vec<String>,
    pub current_phase: Option<String>,
    pub time_to_next_phase: Option<String>,
    pub confidence: String,
    pub clinical_info: ClinicalInfo,
}

/// Immutable table of phase boundaries, grouped by video id.
///
/// Within each video the boundaries are sorted by frame ascending; ties keep
/// their original row order (stable sort at build time).
#[derive(Debug, Default)]
pub struct TimelineTable {
    by_video: HashMap<i64, Vec<PhaseBoundary>>,
}

impl TimelineTable {
    /// Build the table from already-joined boundary rows.
    pub fn from_boundaries(rows: Vec<PhaseBoundary>) -> Self {
        let mut by_video: HashMap<i64, Vec<PhaseBoundary>> = HashMap::new();
        for row in rows {
            by_video.entry(row.video_id).or_default().push(row);
        }
        for boundaries in by_video.values_mut() {
            // sort_by_key is stable, so equal frames keep load order
            boundaries.sort_by_key(|b| b.frame);
        }
        Self { by_video }
    }

    /// Boundaries for one video, sorted by frame. `None` if the video has
    /// no annotations at all.
    pub fn boundaries(&self, video_id: i64) -> Option<&[PhaseBoundary]> {
        self.by_video.get(&video_id).map(Vec::as_slice)
    }

    /// Total number of boundary rows across all videos.
    pub fn len(&self) -> usize {
        self.by_video.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_video.is_empty()
    }

    /// Number of distinct videos with annotations.
    pub fn video_count(&self) -> usize {
        self.by_video.len()
    }
}

/// Query service over the timeline table.
///
/// Pure read-only lookups; the only non-determinism is the injected
/// confidence generator, which tests replace with a fixed one.
pub struct TimelineService {
    table: TimelineTable,
    confidence: Arc<dyn ConfidenceGenerator>,
    procedure: String,
    clinical_info: ClinicalInfo,
}

impl TimelineService {
    pub fn new(
        table: TimelineTable,
        confidence: Arc<dyn ConfidenceGenerator>,
        procedure: String,
        clinical_info: ClinicalInfo,
    ) -> Self {
        Self {
            table,
            confidence,
            procedure,
            clinical_info,
        }
    }

    pub fn table(&self) -> &TimelineTable {
        &self.table
    }

    /// Overlay snapshot at `frame` of `video_id`.
    ///
    /// Fails with `NoAnnotations` when the video has no boundary rows.
    pub fn snapshot(&self, video_id: i64, frame: u64) -> Result<TimelineSnapshot> {
        let boundaries = self
            .table
            .boundaries(video_id)
            .ok_or(PhaseServerError::NoAnnotations(video_id))?;

        let phases = boundaries.iter().map(PhaseBoundary::display).collect();

        // Last boundary whose frame <= query frame; ties resolve to the
        // later row because partition_point finds the upper bound.
        let idx = boundaries.partition_point(|b| b.frame <= frame);
        if idx == 0 {
            // The query frame precedes the first recorded phase.
            return Ok(TimelineSnapshot {
                procedure: self.procedure.clone(),
                phases,
                current_phase: None,
                time_to_next_phase: None,
                confidence: "100.0%".to_string(),
                clinical_info: self.clinical_info.clone(),
            });
        }

        let current = &boundaries[idx - 1];
        let seconds_to_next = match boundaries.get(idx) {
            Some(next) => next.frame.saturating_sub(frame) as f64 / FRAME_RATE,
            None => 0.0,
        };

        Ok(TimelineSnapshot {
            procedure: self.procedure.clone(),
            phases,
            current_phase: Some(current.display()),
            time_to_next_phase: Some(format_mmss(seconds_to_next)),
            confidence: format!("{:.1}%", self.confidence.generate()),
            clinical_info: self.clinical_info.clone(),
        })
    }
}

/// Zero-padded `mm:ss` from a second count.
fn format_mmss(seconds: f64) -> String {
    let mm = (seconds / 60.0) as u64;
    let ss = (seconds % 60.0) as u64;
    format!("{:02}:{:02}", mm, ss)
}
