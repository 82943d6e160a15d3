//! Client-side core for the token statistics uploader.
//!
//! Everything here is platform neutral: HTTP, storage and the page itself are
//! reached through the traits in [`flow`] and [`prefs`], so the whole
//! upload → analyze → render sequence runs on the host in tests and in the
//! browser through `tokstat_web`.

use serde::Deserialize;
use thiserror::Error;

pub mod api;
pub mod carousel;
pub mod flow;
pub mod gate;
pub mod notice;
pub mod prefs;
pub mod report;
pub mod session;

pub use api::{decode_graph_data, decode_upload, AnalysisData, GraphDataResponse, Reply, UploadResult};
pub use carousel::Carousel;
pub use flow::{render, reset, submit, AnalysisApi, Notifier, ResultsView, SubmitOutcome};
pub use gate::{GateGuard, TaskGate};
pub use notice::ToastState;
pub use prefs::{DarkMode, KeyValueStore, DARK_CLASS};
pub use report::{FileReport, RenderBlock, Row, Table};
pub use session::{FileHandle, KeyFocus, UploadSession, ANALYZE_BUTTON_ID};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TsError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("server rejected the request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl TsError {
    /// Text suitable for showing to the user. Only a server-provided
    /// rejection message is passed through; everything else collapses to
    /// `fallback` so raw transport errors never reach the page.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            TsError::Rejected(Some(message)) if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub upload_path: String,
    pub reset_path: String,
    pub graph_data_path: String,
    pub export_path: String,
    pub graphs_path: String,
    pub home_path: String,
    pub storage_key: String,
    pub toast_ms: u32,
    pub top_n: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upload_path: "/upload".to_string(),
            reset_path: "/reset".to_string(),
            graph_data_path: "/api/graph-data".to_string(),
            export_path: "/export-processed-data".to_string(),
            graphs_path: "/graphs".to_string(),
            home_path: "/".to_string(),
            storage_key: "darkMode".to_string(),
            toast_ms: 3000,
            top_n: 5,
        }
    }
}

impl ClientConfig {
    pub fn graph_data_url(&self, filename: &str) -> String {
        with_file_query(&self.graph_data_path, filename)
    }

    pub fn export_url(&self, filename: &str) -> String {
        with_file_query(&self.export_path, filename)
    }
}

fn with_file_query(path: &str, filename: &str) -> String {
    format!("{path}?file={}", urlencoding::encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_query_is_percent_encoded() {
        let config = ClientConfig::default();
        assert_eq!(
            config.graph_data_url("day 1&2.csv"),
            "/api/graph-data?file=day%201%262.csv"
        );
        assert_eq!(
            config.export_url("a.csv"),
            "/export-processed-data?file=a.csv"
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"toast_ms": 1500, "upload_path": "/api/upload"}"#).unwrap();
        assert_eq!(config.toast_ms, 1500);
        assert_eq!(config.upload_path, "/api/upload");
        assert_eq!(config.storage_key, "darkMode");
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn only_rejections_leak_server_text() {
        let fallback = "generic";
        assert_eq!(
            TsError::Rejected(Some("bad file".into())).user_message(fallback),
            "bad file"
        );
        assert_eq!(TsError::Rejected(Some("  ".into())).user_message(fallback), fallback);
        assert_eq!(TsError::Rejected(None).user_message(fallback), fallback);
        assert_eq!(
            TsError::Transport("dns lookup failed".into()).user_message(fallback),
            fallback
        );
        assert_eq!(TsError::Status(502).user_message(fallback), fallback);
    }
}
