//! Prior-attempt handling. Entries arrive as loosely shaped JSON from the
//! client; parsing is tolerant of missing fields but rejects non-objects at
//! the boundary. At most the five most recent attempts are considered.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::lexicon;
use super::signals::SignalBundle;
use super::util::{round1, round2};

/// How many prior attempts feed the comparator.
pub const MAX_HISTORY_ENTRIES: usize = 5;

#[derive(Debug, Error)]
pub enum HistoryParseError {
    #[error("history entry at index {index} must be a JSON object")]
    NotAnObject { index: usize },
}

/// One prior attempt. Every field is optional; a snapshot is rebuilt from
/// whatever survives.
#[derive(Debug, Clone, Default)]
pub struct HistoryEntry {
    pub transcript: Option<String>,
    pub duration_seconds: Option<f64>,
    pub scores: Option<Value>,
    pub explanations: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// Lenient single-entry parse. Unknown fields are ignored; known fields
    /// with the wrong shape degrade to `None` instead of failing the entry.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, HistoryParseError> {
        let obj = value
            .as_object()
            .ok_or(HistoryParseError::NotAnObject { index })?;
        Ok(Self {
            transcript: obj
                .get("transcript")
                .and_then(Value::as_str)
                .map(str::to_string),
            duration_seconds: obj.get("duration_seconds").and_then(lenient_number),
            scores: obj.get("scores").filter(|v| v.is_object()).cloned(),
            explanations: obj.get("explanations").cloned(),
            recorded_at: obj
                .get("recorded_at")
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse().ok()),
        })
    }

    pub fn parse_all(values: &[Value]) -> Result<Vec<Self>, HistoryParseError> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| Self::from_value(index, value))
            .collect()
    }

    fn snapshot(&self) -> MetricSnapshot {
        let scores = self.scores.as_ref().and_then(Value::as_object);
        let score_field = |key: &str| {
            scores
                .and_then(|map| map.get(key))
                .and_then(lenient_number)
        };
        let mut snapshot = MetricSnapshot {
            total: score_field("total"),
            clarity: score_field("clarity"),
            concision: score_field("concision"),
            content: score_field("content"),
            confidence: score_field("confidence"),
            ..MetricSnapshot::default()
        };

        let explanations = self.normalized_explanations();
        if let Some(exp) = explanations {
            snapshot.wpm = exp.get("wpm").and_then(lenient_number);
            snapshot.fillers_per_100w = exp.get("fillers_per_100w").and_then(lenient_number);
            snapshot.hedges_per_100w = exp.get("hedges_per_100w").and_then(lenient_number);
            snapshot.star_coverage = exp
                .get("star")
                .and_then(Value::as_object)
                .and_then(|star| star.get("coverage"))
                .and_then(lenient_number);
            snapshot.result_strength = exp
                .get("result_strength")
                .and_then(Value::as_object)
                .and_then(|result| result.get("score"))
                .and_then(lenient_number);
        } else if let Some(transcript) = self.transcript.as_deref().filter(|t| !t.is_empty()) {
            let bundle = SignalBundle::extract(transcript, self.duration_seconds.unwrap_or(0.0));
            snapshot.fillers_per_100w = Some(bundle.fillers.per_100w);
            snapshot.hedges_per_100w = Some(bundle.hedges.per_100w);
            snapshot.result_strength = Some(bundle.result.score);
            snapshot.star_coverage = Some(f64::from(bundle.star.coverage));
            if self.duration_seconds.map_or(false, |d| d != 0.0) {
                let minutes = (self.duration_seconds.unwrap_or(0.0) / 60.0).max(0.001);
                snapshot.wpm = Some(lexicon::tokenize(transcript).len() as f64 / minutes);
            }
        }
        snapshot
    }

    /// Stored explanations may be a JSON object or a serialized string of
    /// one. Anything else counts as absent.
    fn normalized_explanations(&self) -> Option<serde_json::Map<String, Value>> {
        let raw = self.explanations.as_ref()?;
        let map = match raw {
            Value::Object(map) => map.clone(),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                _ => return None,
            },
            _ => return None,
        };
        if map.is_empty() {
            None
        } else {
            Some(map)
        }
    }
}

/// Per-attempt metrics reconstructed from a history entry. Fields stay
/// `None` when the entry carried nothing usable for them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricSnapshot {
    pub total: Option<f64>,
    pub clarity: Option<f64>,
    pub concision: Option<f64>,
    pub content: Option<f64>,
    pub confidence: Option<f64>,
    pub wpm: Option<f64>,
    pub fillers_per_100w: Option<f64>,
    pub hedges_per_100w: Option<f64>,
    pub result_strength: Option<f64>,
    pub star_coverage: Option<f64>,
}

pub fn build_snapshots(history: &[HistoryEntry]) -> Vec<MetricSnapshot> {
    history
        .iter()
        .take(MAX_HISTORY_ENTRIES)
        .map(HistoryEntry::snapshot)
        .collect()
}

/// Signed current-minus-previous deltas against the most recent attempt,
/// rounded to two decimals. `None` when the prior value was unavailable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricDeltas {
    pub fillers_per_100w: Option<f64>,
    pub hedges_per_100w: Option<f64>,
    pub result_strength: Option<f64>,
    pub star_coverage: Option<f64>,
    pub wpm: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistingFlag {
    ResultStrength,
    Fillers,
    Structure,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistorySummary {
    pub attempt_count: usize,
    pub last_total: Option<f64>,
    pub delta_total: Option<f64>,
    pub best_total: Option<f64>,
    pub avg_total: Option<f64>,
    pub metric_deltas: MetricDeltas,
    pub persisting_flags: Vec<PersistingFlag>,
    pub last_metrics: MetricSnapshot,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl HistorySummary {
    pub fn build(
        snapshots: &[MetricSnapshot],
        signals: &SignalBundle,
        current_total: f64,
        last_attempt_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut summary = Self {
            attempt_count: snapshots.len(),
            last_metrics: snapshots.first().cloned().unwrap_or_default(),
            last_attempt_at,
            ..Self::default()
        };
        let Some(last) = snapshots.first() else {
            return summary;
        };

        summary.last_total = last.total;
        let totals: Vec<f64> = snapshots.iter().filter_map(|s| s.total).collect();
        if !totals.is_empty() {
            summary.best_total = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max).into();
            summary.avg_total = Some(totals.iter().sum::<f64>() / totals.len() as f64);
        }
        if let Some(last_total) = last.total {
            summary.delta_total = Some(round1(current_total - last_total));
        }

        let delta = |prev: Option<f64>, current: f64| prev.map(|p| round2(current - p));
        summary.metric_deltas = MetricDeltas {
            fillers_per_100w: delta(last.fillers_per_100w, signals.fillers.per_100w),
            hedges_per_100w: delta(last.hedges_per_100w, signals.hedges.per_100w),
            result_strength: delta(last.result_strength, signals.result.score),
            star_coverage: delta(last.star_coverage, f64::from(signals.star.coverage)),
            wpm: delta(last.wpm, signals.wpm),
        };

        if last
            .result_strength
            .map_or(false, |prev| signals.result.score < 0.5 && prev < 0.5)
        {
            summary.persisting_flags.push(PersistingFlag::ResultStrength);
        }
        if last
            .fillers_per_100w
            .map_or(false, |prev| signals.fillers.per_100w > 2.5 && prev > 2.5)
        {
            summary.persisting_flags.push(PersistingFlag::Fillers);
        }
        if last
            .star_coverage
            .map_or(false, |prev| signals.star.coverage < 3 && prev < 3.0)
        {
            summary.persisting_flags.push(PersistingFlag::Structure);
        }
        summary
    }
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
