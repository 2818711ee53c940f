//! Surgical-video phase server
//!
//! Serves a seekable video stream for a recorded procedure (HTTP range
//! requests, chunked partial-content responses) and a per-frame overlay
//! lookup that reports the current procedure phase, time to the next phase,
//! and a synthetic confidence value.

pub mod config;
pub mod confidence;
pub mod error;
pub mod http;
pub mod media;
pub mod range;
pub mod state;
pub mod timeline;
