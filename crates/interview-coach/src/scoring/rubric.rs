//! Question-mode inference and rubric construction.
//!
//! Three fixed rubric templates exist, one per question mode. Resolving a
//! rubric mixes the template's vocabulary with the top non-stopword tokens of
//! the prompt, so matching stays partly question-adaptive. The resolved
//! rubric is immutable and passed explicitly into the alignment evaluator.

use serde::Serialize;

use super::lexicon::{
    self, ACTION_CUES, ACTION_VERBS, BLAME_PHRASES, COMPLEXITY_TERMS, DATA_TERMS, EDGE_TERMS,
    REFLECTION_CUES, RELIABILITY_TERMS, REQUIREMENTS_TERMS, RESULT_CUES, SCALING_TERMS,
    SITUATION_CUES, TASK_CUES, TRADEOFF_TERMS,
};
use super::signals::SignalBundle;

const PROMPT_KEYWORD_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMode {
    Behavioral,
    Technical,
    SystemDesign,
}

impl QuestionMode {
    /// Infer the mode from the question id (when present) and prompt text.
    /// Behavioral is the default when no technical vocabulary appears.
    pub fn infer(question_id: Option<&str>, question_text: &str) -> Self {
        let mut haystack = question_id.unwrap_or_default().to_lowercase();
        haystack.push_str(&question_text.to_lowercase());

        if ["system", "architecture", "design"]
            .iter()
            .any(|term| haystack.contains(term))
        {
            Self::SystemDesign
        } else if ["technical", "code", "algorithm", "debug"]
            .iter()
            .any(|term| haystack.contains(term))
        {
            Self::Technical
        } else {
            Self::Behavioral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Behavioral => "behavioral",
            Self::Technical => "technical",
            Self::SystemDesign => "system_design",
        }
    }
}

/// Signals a metric gate can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMetric {
    ActionsDensity,
    ResultStrength,
    Reflection,
    HasRequirements,
    HasEdges,
    HasComplexity,
    HasTradeoffs,
    HasData,
    HasScaling,
}

/// Alternative way for a topic to be satisfied when none of its keywords
/// appear verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricGate {
    AtLeast(GateMetric, f64),
    AtMost(GateMetric, f64),
    Equals(GateMetric, bool),
}

impl MetricGate {
    pub fn is_met(&self, signals: &SignalBundle) -> bool {
        match self {
            Self::AtLeast(metric, min) => Self::number(*metric, signals) >= *min,
            Self::AtMost(metric, max) => Self::number(*metric, signals) <= *max,
            Self::Equals(metric, target) => Self::flag(*metric, signals) == *target,
        }
    }

    fn number(metric: GateMetric, signals: &SignalBundle) -> f64 {
        match metric {
            GateMetric::ActionsDensity => signals.actions.density,
            GateMetric::ResultStrength => signals.result.score,
            other => f64::from(u8::from(Self::flag(other, signals))),
        }
    }

    fn flag(metric: GateMetric, signals: &SignalBundle) -> bool {
        match metric {
            GateMetric::ActionsDensity => signals.actions.density > 0.0,
            GateMetric::ResultStrength => signals.result.score > 0.0,
            GateMetric::Reflection => signals.reflection.has_reflection,
            GateMetric::HasRequirements => signals.has_requirements,
            GateMetric::HasEdges => signals.has_edges,
            GateMetric::HasComplexity => signals.has_complexity,
            GateMetric::HasTradeoffs => signals.has_tradeoffs,
            GateMetric::HasData => signals.has_data,
            GateMetric::HasScaling => signals.has_scaling,
        }
    }
}

/// One weighted expectation the answer should cover.
#[derive(Debug, Clone)]
pub struct RubricTopic {
    pub id: &'static str,
    pub label: &'static str,
    pub weight: f64,
    pub keywords: Vec<String>,
    pub gate: Option<MetricGate>,
    pub remedy: &'static str,
}

/// A resolved rubric for one question.
#[derive(Debug, Clone)]
pub struct Rubric {
    pub title: String,
    pub mode: QuestionMode,
    pub topics: Vec<RubricTopic>,
    /// Phrases that cost credit when present (blame-shifting in behavioral
    /// answers).
    pub negative: &'static [&'static str],
}

impl Rubric {
    /// Build the rubric for a question, mixing the mode template with
    /// keywords drawn from the prompt itself.
    pub fn resolve(mode: QuestionMode, question_text: &str) -> Self {
        let prompt = lexicon::extract_keywords(question_text, PROMPT_KEYWORD_LIMIT);
        let topics = match mode {
            QuestionMode::Behavioral => behavioral_topics(&prompt),
            QuestionMode::Technical => technical_topics(&prompt),
            QuestionMode::SystemDesign => system_design_topics(&prompt),
        };
        let negative: &'static [&'static str] = match mode {
            QuestionMode::Behavioral => BLAME_PHRASES,
            _ => &[],
        };
        Self {
            title: question_text.to_string(),
            mode,
            topics,
            negative,
        }
    }

    pub fn total_weight(&self) -> f64 {
        let sum: f64 = self.topics.iter().map(|t| t.weight).sum();
        if sum > 0.0 {
            sum
        } else {
            1.0
        }
    }
}

fn keywords(groups: &[&[&str]], extra: &[&str], prompt: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for group in groups {
        out.extend(group.iter().map(|term| term.to_string()));
    }
    out.extend(extra.iter().map(|term| term.to_string()));
    out.extend(prompt.iter().cloned());
    out
}

fn behavioral_topics(prompt: &[String]) -> Vec<RubricTopic> {
    vec![
        RubricTopic {
            id: "situation",
            label: "Set context and stakes",
            weight: 0.20,
            keywords: keywords(&[SITUATION_CUES], &[], prompt),
            gate: None,
            remedy: "Open with the situation or context to set stakes quickly.",
        },
        RubricTopic {
            id: "task",
            label: "Clarify your responsibility or goal",
            weight: 0.18,
            keywords: keywords(&[TASK_CUES], &["goal", "objective"], prompt),
            gate: None,
            remedy: "State your role and what you needed to accomplish.",
        },
        RubricTopic {
            id: "action",
            label: "Describe decisive actions you took",
            weight: 0.26,
            keywords: keywords(&[ACTION_CUES, ACTION_VERBS], &[], &[]),
            gate: Some(MetricGate::AtLeast(GateMetric::ActionsDensity, 0.014)),
            remedy: "Emphasize the actions you personally took, not the team in general.",
        },
        RubricTopic {
            id: "result",
            label: "Close with tangible results",
            weight: 0.22,
            keywords: keywords(&[RESULT_CUES], &["impact", "outcome", "improved"], prompt),
            gate: Some(MetricGate::AtLeast(GateMetric::ResultStrength, 0.45)),
            remedy: "Finish with a measurable or observable outcome.",
        },
        RubricTopic {
            id: "reflection",
            label: "Share a takeaway or learning",
            weight: 0.14,
            keywords: keywords(&[REFLECTION_CUES], &[], &[]),
            gate: Some(MetricGate::Equals(GateMetric::Reflection, true)),
            remedy: "Add a quick takeaway or what you'd do differently next time.",
        },
    ]
}

fn technical_topics(prompt: &[String]) -> Vec<RubricTopic> {
    vec![
        RubricTopic {
            id: "problem",
            label: "Frame the problem and constraints",
            weight: 0.18,
            keywords: keywords(&[REQUIREMENTS_TERMS], &[], prompt),
            gate: Some(MetricGate::Equals(GateMetric::HasRequirements, true)),
            remedy: "Start by clarifying requirements, constraints, and goal.",
        },
        RubricTopic {
            id: "approach",
            label: "Propose a concrete approach",
            weight: 0.22,
            keywords: keywords(&[], &["approach", "solution", "algorithm", "design", "plan"], &[]),
            gate: Some(MetricGate::AtLeast(GateMetric::ActionsDensity, 0.012)),
            remedy: "Outline a step-by-step approach or algorithm.",
        },
        RubricTopic {
            id: "correctness",
            label: "Address correctness and edge cases",
            weight: 0.18,
            keywords: keywords(&[EDGE_TERMS], &["test", "verify", "validate"], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasEdges, true)),
            remedy: "Mention edge cases or how you would validate correctness.",
        },
        RubricTopic {
            id: "complexity",
            label: "Discuss performance or complexity",
            weight: 0.20,
            keywords: keywords(&[COMPLEXITY_TERMS, SCALING_TERMS], &[], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasComplexity, true)),
            remedy: "Call out performance considerations or complexity.",
        },
        RubricTopic {
            id: "tradeoffs",
            label: "Explain tradeoffs",
            weight: 0.22,
            keywords: keywords(&[TRADEOFF_TERMS], &[], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasTradeoffs, true)),
            remedy: "State tradeoffs (latency vs cost, consistency vs availability, etc.).",
        },
    ]
}

fn system_design_topics(prompt: &[String]) -> Vec<RubricTopic> {
    vec![
        RubricTopic {
            id: "requirements",
            label: "Clarify requirements and constraints",
            weight: 0.18,
            keywords: keywords(&[REQUIREMENTS_TERMS], &[], prompt),
            gate: Some(MetricGate::Equals(GateMetric::HasRequirements, true)),
            remedy: "Start by defining requirements, scale, and constraints.",
        },
        RubricTopic {
            id: "architecture",
            label: "Propose a high-level architecture",
            weight: 0.22,
            keywords: keywords(
                &[SCALING_TERMS],
                &["architecture", "components", "services", "pipeline"],
                &[],
            ),
            gate: None,
            remedy: "Describe the major components and data flow.",
        },
        RubricTopic {
            id: "data",
            label: "Cover data model or storage",
            weight: 0.18,
            keywords: keywords(&[DATA_TERMS], &["cache", "index"], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasData, true)),
            remedy: "Call out what data you store and where.",
        },
        RubricTopic {
            id: "scale",
            label: "Discuss scaling and reliability",
            weight: 0.22,
            keywords: keywords(&[SCALING_TERMS, RELIABILITY_TERMS], &[], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasScaling, true)),
            remedy: "Explain how the design handles scale, failures, and reliability.",
        },
        RubricTopic {
            id: "tradeoffs",
            label: "Explain tradeoffs",
            weight: 0.20,
            keywords: keywords(&[TRADEOFF_TERMS], &[], &[]),
            gate: Some(MetricGate::Equals(GateMetric::HasTradeoffs, true)),
            remedy: "State the tradeoffs you would make and why.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_behavioral() {
        let mode = QuestionMode::infer(None, "Tell me about a challenge you faced.");
        assert_eq!(mode, QuestionMode::Behavioral);
    }

    #[test]
    fn design_vocabulary_selects_system_design() {
        let mode = QuestionMode::infer(None, "Design a URL shortener.");
        assert_eq!(mode, QuestionMode::SystemDesign);
    }

    #[test]
    fn debugging_vocabulary_selects_technical() {
        let mode = QuestionMode::infer(None, "How would you debug a memory leak?");
        assert_eq!(mode, QuestionMode::Technical);
    }

    #[test]
    fn question_id_contributes_to_inference() {
        let mode = QuestionMode::infer(Some("system-design-cache"), "Walk me through your plan.");
        assert_eq!(mode, QuestionMode::SystemDesign);
    }

    #[test]
    fn rubric_weights_sum_to_about_one() {
        for mode in [
            QuestionMode::Behavioral,
            QuestionMode::Technical,
            QuestionMode::SystemDesign,
        ] {
            let rubric = Rubric::resolve(mode, "Describe your approach.");
            assert_eq!(rubric.topics.len(), 5);
            assert!((rubric.total_weight() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prompt_keywords_flow_into_topic_keyword_sets() {
        let rubric = Rubric::resolve(QuestionMode::Behavioral, "Tell me about a mentorship win.");
        let situation = &rubric.topics[0];
        assert!(situation.keywords.iter().any(|k| k == "mentorship"));
    }
}
