//! Shared harness for the HTTP integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;

use phase_server::config::{DataConfig, ServerConfig};
use phase_server::confidence::FixedConfidence;
use phase_server::http::create_router;
use phase_server::state::AppState;
use phase_server::timeline::{PhaseBoundary, TimelineTable};

pub struct TestHarness {
    /// Keeps the video directory alive for the duration of the test.
    pub video_dir: TempDir,
}

impl TestHarness {
    /// Start a server on an ephemeral port with the standard three-phase
    /// fixture for video 269 and a pinned confidence of 97.2%.
    pub async fn with_server() -> (Self, SocketAddr) {
        let video_dir = TempDir::new().unwrap();

        let config = ServerConfig {
            data: DataConfig {
                video_dir: video_dir.path().to_string_lossy().to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let table = TimelineTable::from_boundaries(vec![
            boundary(269, 0, 1, "Preparation"),
            boundary(269, 500, 2, "Calot triangle dissection"),
            boundary(269, 1200, 3, "Clipping and cutting"),
        ]);

        let state = Arc::new(AppState::new(
            config,
            table,
            Arc::new(FixedConfidence(97.2)),
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Self { video_dir }, addr)
    }

    /// Write a video file for `video_id` into the harness directory.
    pub fn write_video(&self, video_id: i64, data: &[u8]) {
        std::fs::write(
            self.video_dir.path().join(format!("case_{}.mp4", video_id)),
            data,
        )
        .unwrap();
    }
}

fn boundary(video_id: i64, frame: u64, phase_id: u32, label: &str) -> PhaseBoundary {
    PhaseBoundary {
        video_id,
        frame,
        phase_id,
        label: label.to_string(),
    }
}
