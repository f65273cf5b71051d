use interview_coach::error::AppError;
use interview_coach::scoring::{HistoryEntry, ScoringEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<ScoringEngine>,
    pub(crate) max_transcript_chars: usize,
}

/// Parse a history payload that arrived as a JSON array of entries.
pub(crate) fn parse_history(values: &[serde_json::Value]) -> Result<Vec<HistoryEntry>, AppError> {
    HistoryEntry::parse_all(values).map_err(AppError::from)
}

/// Load prior attempts from a JSON file for the CLI path.
pub(crate) fn load_history_file(path: &Path) -> Result<Vec<HistoryEntry>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| AppError::InvalidRequest(format!("history file is not valid JSON: {err}")))?;
    let values = parsed
        .as_array()
        .ok_or_else(|| AppError::InvalidRequest("history file must hold a JSON array".to_string()))?;
    parse_history(values)
}
