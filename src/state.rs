//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - The immutable timeline lookup service
//! - The media store (video id -> file resolution)
//! - Server configuration
//!
//! Everything here is read-only after startup; requests share it through
//! an `Arc` without locking.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::confidence::ConfidenceGenerator;
use crate::media::MediaStore;
use crate::timeline::{TimelineService, TimelineTable};

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Timeline lookup service over the startup-loaded boundary table
    pub timeline: TimelineService,

    /// Video file resolution
    pub media: MediaStore,
}

impl AppState {
    /// Create state from a loaded boundary table and a confidence source.
    pub fn new(
        config: ServerConfig,
        table: TimelineTable,
        confidence: Arc<dyn ConfidenceGenerator>,
    ) -> Self {
        let timeline = TimelineService::new(
            table,
            confidence,
            config.timeline.procedure.clone(),
            config.timeline.clinical_info.clone(),
        );
        let media = MediaStore::new(config.data.video_dir.clone());
        Self {
            config,
            timeline,
            media,
        }
    }

    /// Video id used when a request does not specify one.
    pub fn default_video_id(&self) -> i64 {
        self.config.timeline.default_video_id
    }
}
