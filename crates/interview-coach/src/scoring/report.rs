//! Turns raw subscores and signals into reviewer-facing issues, suggestions,
//! and strengths.

use serde::Serialize;

use super::aggregate::{Aggregate, EngineConfig};
use super::alignment::QuestionAlignment;
use super::signals::SignalBundle;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingStar,
    LowRelevance,
    Rambling,
    FillerHeavy,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(rename = "evidenceSnippet")]
    pub evidence_snippet: String,
    #[serde(rename = "fixSuggestion")]
    pub fix_suggestion: String,
}

impl Issue {
    fn new(kind: IssueKind, severity: Severity, evidence: String, fix: &str) -> Self {
        Self {
            kind,
            severity,
            evidence_snippet: evidence,
            fix_suggestion: fix.to_string(),
        }
    }
}

pub fn detect_issues(
    config: &EngineConfig,
    aggregate: &Aggregate,
    signals: &SignalBundle,
) -> Vec<Issue> {
    let sentences = &signals.sentences.sentences;
    let mut issues = Vec::new();

    if aggregate.raw.structure < 0.6 {
        if let Some(first) = sentences.first() {
            issues.push(Issue::new(
                IssueKind::MissingStar,
                Severity::Medium,
                first.clone(),
                "Structure your answer with Situation, Task, Action, and Result.",
            ));
        }
    }
    if aggregate.raw.relevance < config.thresholds.relevance_floor {
        if let Some(first) = sentences.first() {
            issues.push(Issue::new(
                IssueKind::LowRelevance,
                Severity::Medium,
                first.clone(),
                "Tie your answer more directly to the question prompt.",
            ));
        }
    }
    if aggregate.raw.conciseness < 0.55 {
        if let Some(last) = sentences.last() {
            issues.push(Issue::new(
                IssueKind::Rambling,
                Severity::Low,
                last.clone(),
                "Aim for 1.5-2.5 minutes. Cut filler sentences.",
            ));
        }
    }
    if signals.fillers.per_100w > config.thresholds.max_filler_per_100 {
        let evidence = signals
            .fillers
            .details
            .iter()
            .take(3)
            .map(|(term, count)| format!("{term} ({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        issues.push(Issue::new(
            IssueKind::FillerHeavy,
            Severity::Low,
            evidence,
            "Pause instead of saying \"um\", \"uh\", or \"like\".",
        ));
    }
    issues
}

/// Alignment remedies come first; issue fixes only back-fill when the rubric
/// had nothing to say.
pub fn suggestions(alignment: &QuestionAlignment, issues: &[Issue]) -> Vec<String> {
    let from_alignment: Vec<String> = alignment.suggestions.iter().take(3).cloned().collect();
    if !from_alignment.is_empty() {
        return from_alignment;
    }
    issues
        .iter()
        .take(3)
        .map(|issue| issue.fix_suggestion.clone())
        .collect()
}

pub fn strengths(
    alignment: &QuestionAlignment,
    aggregate: &Aggregate,
    signals: &SignalBundle,
) -> Vec<String> {
    let mut strengths: Vec<String> = alignment.strengths.iter().take(3).cloned().collect();
    if aggregate.raw.delivery > 0.8 {
        strengths.push("Confident delivery with minimal hedging.".to_string());
    }
    if signals.quantification.has_numbers {
        strengths.push("Impact backed by metrics.".to_string());
    }
    strengths.truncate(5);
    strengths
}
