//! Deterministic interview-answer scoring.
//!
//! The pipeline is pure and stateless: extract signals from the transcript,
//! resolve a rubric for the question, score alignment against it, blend the
//! subscores, and compare against prior attempts. Same inputs, same output,
//! byte for byte.

pub mod aggregate;
pub mod alignment;
pub mod history;
pub mod lexicon;
pub mod report;
pub mod rubric;
pub mod signals;
mod util;

use serde::Serialize;

pub use aggregate::{EngineConfig, Subscores, Thresholds, Weights};
pub use alignment::QuestionAlignment;
pub use history::{HistoryEntry, HistoryParseError, HistorySummary};
pub use report::Issue;
pub use rubric::QuestionMode;
pub use signals::SignalBundle;

use aggregate::Aggregate;
use util::{round1, round2, round4};

/// Compact signal readout surfaced next to the weights.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainSignals {
    pub star_coverage: u8,
    pub result_strength: f64,
    pub filler_rate: f64,
    pub hedge_rate: f64,
    pub wpm: f64,
    pub avg_sentence_length: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explain {
    pub weights: Weights,
    pub signals: ExplainSignals,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TopicalSignals {
    pub has_requirements: bool,
    pub has_tradeoffs: bool,
    pub has_reliability: bool,
    pub has_edges: bool,
    pub has_complexity: bool,
    pub has_scaling: bool,
    pub has_data: bool,
    pub has_api: bool,
}

/// Full per-detector dump, rounded where a metric is noisy past a few
/// decimals.
#[derive(Debug, Clone, Serialize)]
pub struct Explanations {
    pub wpm: f64,
    pub avg_sentence_len: f64,
    pub fillers_per_100w: f64,
    pub hedges_per_100w: f64,
    pub action_density: f64,
    pub i_we: signals::OwnershipStats,
    pub quantification: signals::Quantification,
    pub star: signals::StarSegments,
    pub sequence: signals::StarSequence,
    pub result_strength: signals::ResultStrength,
    pub vagueness: signals::Vagueness,
    pub lexical: signals::LexicalStats,
    pub reflection: signals::Reflection,
    pub topical: TopicalSignals,
    pub question_alignment: QuestionAlignment,
}

/// Raw term evidence behind the metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Detected {
    pub fillers: Vec<(String, u32)>,
    pub hedges: Vec<(String, u32)>,
    pub action_verbs: Vec<String>,
    pub numbers: Vec<String>,
    pub time_terms: Vec<String>,
    pub sentences: Vec<String>,
    pub reflection_phrases: Vec<String>,
    pub question_alignment: QuestionAlignment,
}

/// Subscores plus the weighted total, kept for clients that still read the
/// flat score map.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scores {
    #[serde(flatten)]
    pub subscores: Subscores,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringResult {
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    pub subscores: Subscores,
    pub issues: Vec<Issue>,
    pub explain: Explain,
    pub scores: Scores,
    pub explanations: Explanations,
    pub detected: Detected,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub history_summary: HistorySummary,
    pub question_alignment: QuestionAlignment,
    pub transcript: String,
    pub duration_seconds: f64,
}

/// Stateless scoring engine. One instance can serve any number of concurrent
/// calls; all state lives on the stack of [`ScoringEngine::score`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn score(
        &self,
        transcript: &str,
        question: &str,
        duration_seconds: f64,
        history: &[HistoryEntry],
        question_id: Option<&str>,
    ) -> ScoringResult {
        let signals = SignalBundle::extract(transcript, duration_seconds);
        let mode = QuestionMode::infer(question_id, question);
        let rubric = rubric::Rubric::resolve(mode, question);
        let question_alignment = alignment::evaluate(&rubric, transcript, &signals);

        let snapshots = history::build_snapshots(history);
        let agg = aggregate::aggregate(
            &self.config,
            &signals,
            &question_alignment,
            mode,
            duration_seconds,
            snapshots.first(),
        );

        let last_attempt_at = history.first().and_then(|entry| entry.recorded_at);
        let history_summary =
            HistorySummary::build(&snapshots, &signals, agg.overall, last_attempt_at);

        let issues = report::detect_issues(&self.config, &agg, &signals);
        let suggestions = report::suggestions(&question_alignment, &issues);
        let strengths = report::strengths(&question_alignment, &agg, &signals);

        self.assemble(
            transcript,
            duration_seconds,
            signals,
            question_alignment,
            agg,
            history_summary,
            issues,
            suggestions,
            strengths,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        transcript: &str,
        duration_seconds: f64,
        signals: SignalBundle,
        question_alignment: QuestionAlignment,
        agg: Aggregate,
        history_summary: HistorySummary,
        issues: Vec<Issue>,
        suggestions: Vec<String>,
        strengths: Vec<String>,
    ) -> ScoringResult {
        let explain = Explain {
            weights: self.config.weights,
            signals: ExplainSignals {
                star_coverage: signals.star.coverage,
                result_strength: signals.result.score,
                filler_rate: signals.fillers.per_100w,
                hedge_rate: signals.hedges.per_100w,
                wpm: signals.wpm,
                avg_sentence_length: signals.sentences.avg_len,
            },
        };

        let topical = TopicalSignals {
            has_requirements: signals.has_requirements,
            has_tradeoffs: signals.has_tradeoffs,
            has_reliability: signals.has_reliability,
            has_edges: signals.has_edges,
            has_complexity: signals.has_complexity,
            has_scaling: signals.has_scaling,
            has_data: signals.has_data,
            has_api: signals.has_api,
        };

        let explanations = Explanations {
            wpm: round1(signals.wpm),
            avg_sentence_len: round1(signals.sentences.avg_len),
            fillers_per_100w: round2(signals.fillers.per_100w),
            hedges_per_100w: round2(signals.hedges.per_100w),
            action_density: round4(signals.actions.density),
            i_we: signals.ownership.clone(),
            quantification: signals.quantification.clone(),
            star: signals.star,
            sequence: signals.sequence,
            result_strength: signals.result.clone(),
            vagueness: signals.vagueness.clone(),
            lexical: signals.lexical.clone(),
            reflection: signals.reflection.clone(),
            topical,
            question_alignment: question_alignment.clone(),
        };

        let detected = Detected {
            fillers: signals.fillers.details.clone(),
            hedges: signals.hedges.details.clone(),
            action_verbs: signals.actions.examples.clone(),
            numbers: signals.quantification.numbers.clone(),
            time_terms: signals.quantification.time_terms.clone(),
            sentences: signals.sentences.sentences.clone(),
            reflection_phrases: signals.reflection.phrases.clone(),
            question_alignment: question_alignment.clone(),
        };

        ScoringResult {
            overall_score: agg.overall,
            subscores: agg.rounded,
            issues,
            explain,
            scores: Scores {
                subscores: agg.rounded,
                total: agg.overall,
            },
            explanations,
            detected,
            suggestions,
            strengths,
            history_summary,
            question_alignment,
            transcript: transcript.to_string(),
            duration_seconds,
        }
    }
}

/// One-off scoring with the default configuration.
pub fn score_answer(
    transcript: &str,
    question: &str,
    duration_seconds: f64,
    history: &[HistoryEntry],
    question_id: Option<&str>,
) -> ScoringResult {
    ScoringEngine::default().score(transcript, question, duration_seconds, history, question_id)
}
