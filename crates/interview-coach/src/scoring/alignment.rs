//! Scores how much of the question-specific rubric the transcript evidences.

use serde::Serialize;

use super::rubric::{QuestionMode, Rubric};
use super::signals::SignalBundle;
use super::util::clamp01;

#[derive(Debug, Clone, Serialize)]
pub struct TopicOutcome {
    pub id: &'static str,
    pub label: &'static str,
    pub met: bool,
    pub weight: f64,
}

/// Per-question alignment report, retained verbatim in the scoring result.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionAlignment {
    pub mode: QuestionMode,
    pub score: f64,
    pub topics: Vec<TopicOutcome>,
    pub missing_topics: Vec<String>,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub penalty: f64,
    pub negative_hits: Vec<String>,
}

impl QuestionAlignment {
    pub fn met_ratio(&self) -> f64 {
        if self.topics.is_empty() {
            return 1.0;
        }
        let met = self.topics.iter().filter(|t| t.met).count();
        met as f64 / self.topics.len() as f64
    }
}

/// A topic is met when any of its keywords appear in the transcript or its
/// metric gate passes. Earned weight accumulates only for met topics.
pub fn evaluate(rubric: &Rubric, transcript: &str, signals: &SignalBundle) -> QuestionAlignment {
    let lowered = transcript.to_lowercase();
    let total_weight = rubric.total_weight();

    let mut earned = 0.0;
    let mut topics = Vec::with_capacity(rubric.topics.len());
    let mut suggestions = Vec::new();
    let mut strengths = Vec::new();

    for topic in &rubric.topics {
        let keyword_hit = topic.keywords.iter().any(|kw| lowered.contains(kw.as_str()));
        let gate_hit = topic.gate.map_or(false, |gate| gate.is_met(signals));
        let met = keyword_hit || gate_hit;

        if met {
            earned += topic.weight;
            strengths.push(topic.label.to_string());
        } else {
            suggestions.push(topic.remedy.to_string());
        }

        topics.push(TopicOutcome {
            id: topic.id,
            label: topic.label,
            met,
            weight: topic.weight,
        });
    }

    let negative_hits: Vec<String> = rubric
        .negative
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .map(|phrase| phrase.to_string())
        .collect();
    let penalty = if negative_hits.is_empty() {
        0.0
    } else {
        (0.12 * negative_hits.len() as f64).min(0.25)
    };
    if penalty > 0.0 {
        suggestions.push(
            "Avoid phrasing that sounds like blame; focus on your ownership and collaboration."
                .to_string(),
        );
    }

    let missing_topics = topics
        .iter()
        .filter(|t| !t.met)
        .map(|t| t.label.to_string())
        .collect();

    QuestionAlignment {
        mode: rubric.mode,
        score: clamp01(earned / total_weight),
        topics,
        missing_topics,
        suggestions,
        strengths,
        penalty,
        negative_hits,
    }
}
