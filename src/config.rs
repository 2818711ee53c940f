//! Server configuration

use serde::{Deserialize, Serialize};

use crate::timeline::ClinicalInfo;

/// Reference data and media storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the annotations CSV (`;`-separated: VideoID;FrameNo;Phase)
    pub annotations_path: String,

    /// Path to the phase label CSV (`;`-separated: Phase;Meaning)
    pub phases_path: String,

    /// Directory holding the video files (`case_<id>.mp4`)
    pub video_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            annotations_path: "data/annotations.csv".to_string(),
            phases_path: "data/phases.csv".to_string(),
            video_dir: "videos".to_string(),
        }
    }
}

/// Timeline overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Video id used when a request omits `video_id`
    pub default_video_id: i64,

    /// Procedure label echoed in every `/info` response
    pub procedure: String,

    /// Static clinical record echoed in every `/info` response
    pub clinical_info: ClinicalInfo,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_video_id: 269,
            procedure: "Cholecystectomy".to_string(),
            clinical_info: ClinicalInfo::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Data locations
    pub data: DataConfig,

    /// Timeline overlay settings
    pub timeline: TimelineConfig,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data: DataConfig::default(),
            timeline: TimelineConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
