//! Per-answer metric extraction. Every detector is a pure function of the
//! transcript; [`SignalBundle::extract`] runs them all once and the rest of
//! the pipeline reads from the bundle.

use serde::Serialize;
use std::collections::BTreeSet;

use super::lexicon::{
    self, ACTION_CUES, ACTION_VERBS, API_TERMS, COMPLEXITY_TERMS, DATA_TERMS, EDGE_TERMS,
    END_RESULT_CUES, FILLERS, HEDGES, REFLECTION_CUES, RELIABILITY_TERMS, REQUIREMENTS_TERMS,
    RESULT_CUES, SCALING_TERMS, SITUATION_CUES, TASK_CUES, TIME_TERMS, TRADEOFF_TERMS,
    VAGUE_PHRASES,
};

/// Counts and rate for one lexicon (fillers or hedges).
#[derive(Debug, Clone, Serialize)]
pub struct LexiconStats {
    pub total: u32,
    pub per_100w: f64,
    pub details: Vec<(String, u32)>,
}

impl LexiconStats {
    fn extract(text: &str, terms: &[&str], words: usize) -> Self {
        let (details, total) = lexicon::count_matches(text, terms);
        let per_100w = f64::from(total) / words.max(1) as f64 * 100.0;
        Self {
            total,
            per_100w,
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionVerbStats {
    pub count: u32,
    pub density: f64,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnershipStats {
    pub i: u32,
    pub we: u32,
    pub i_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quantification {
    pub numbers: Vec<String>,
    pub has_numbers: bool,
    pub time_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceStats {
    pub avg_len: f64,
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StarTags {
    pub s: bool,
    pub t: bool,
    pub a: bool,
    pub r: bool,
}

/// Which STAR phases are linguistically evidenced. The Result flag is not
/// cue-based: it is set when result strength clears 0.35.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StarSegments {
    pub tags: StarTags,
    pub coverage: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultStrengthDetails {
    pub cue_hits: Vec<(String, u32)>,
    pub has_numbers: bool,
    pub end_hits: u32,
}

/// 0..1 blend of result cues, numeric evidence, and outcome words placed in
/// the final 30% of the answer.
#[derive(Debug, Clone, Serialize)]
pub struct ResultStrength {
    pub score: f64,
    pub details: ResultStrengthDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct Vagueness {
    pub penalty: f64,
    pub hits: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reflection {
    pub has_reflection: bool,
    pub phrases: Vec<String>,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LexicalStats {
    pub diversity: f64,
    pub long_ratio: f64,
    pub unique: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StarPositions {
    pub s: Option<f64>,
    pub t: Option<f64>,
    pub a: Option<f64>,
    pub r: Option<f64>,
}

/// Earliest cue offset per STAR phase, normalized by transcript length.
/// `ordered` is true iff the offsets that exist strictly increase S<T<A<R.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StarSequence {
    pub positions: StarPositions,
    pub observed: u8,
    pub ordered: bool,
}

/// The full set of extracted metrics for one transcript.
#[derive(Debug, Clone)]
pub struct SignalBundle {
    pub words: usize,
    pub wpm: f64,
    pub fillers: LexiconStats,
    pub hedges: LexiconStats,
    pub actions: ActionVerbStats,
    pub ownership: OwnershipStats,
    pub quantification: Quantification,
    pub sentences: SentenceStats,
    pub star: StarSegments,
    pub result: ResultStrength,
    pub vagueness: Vagueness,
    pub reflection: Reflection,
    pub lexical: LexicalStats,
    pub sequence: StarSequence,
    pub has_requirements: bool,
    pub has_tradeoffs: bool,
    pub has_reliability: bool,
    pub has_edges: bool,
    pub has_complexity: bool,
    pub has_scaling: bool,
    pub has_data: bool,
    pub has_api: bool,
}

impl SignalBundle {
    pub fn extract(transcript: &str, duration_seconds: f64) -> Self {
        let tokens = lexicon::tokenize(transcript);
        let words = tokens.len();
        // degenerate durations clamp to a small positive window
        let minutes = (duration_seconds / 60.0).max(0.001);
        let wpm = words as f64 / minutes;

        let fillers = LexiconStats::extract(transcript, FILLERS, words);
        let hedges = LexiconStats::extract(transcript, HEDGES, words);
        let actions = action_verb_stats(&tokens);
        let ownership = ownership_ratio(&tokens);
        let quantification = quantification(transcript);
        let sentences = sentence_stats(transcript);
        let result = result_strength(transcript);
        let star = star_segments(transcript, result.score);
        let vagueness = vagueness(transcript);
        let reflection = reflection_presence(transcript);
        let lexical = lexical_stats(&tokens);
        let sequence = star_sequence(transcript);

        Self {
            words,
            wpm,
            fillers,
            hedges,
            actions,
            ownership,
            quantification,
            sentences,
            star,
            result,
            vagueness,
            reflection,
            lexical,
            sequence,
            has_requirements: lexicon::keyword_signal(transcript, REQUIREMENTS_TERMS),
            has_tradeoffs: lexicon::keyword_signal(transcript, TRADEOFF_TERMS),
            has_reliability: lexicon::keyword_signal(transcript, RELIABILITY_TERMS),
            has_edges: lexicon::keyword_signal(transcript, EDGE_TERMS),
            has_complexity: lexicon::keyword_signal(transcript, COMPLEXITY_TERMS),
            has_scaling: lexicon::keyword_signal(transcript, SCALING_TERMS),
            has_data: lexicon::keyword_signal(transcript, DATA_TERMS),
            has_api: lexicon::keyword_signal(transcript, API_TERMS),
        }
    }
}

fn action_verb_stats(tokens: &[String]) -> ActionVerbStats {
    let matched: Vec<&String> = tokens
        .iter()
        .filter(|t| ACTION_VERBS.contains(&t.as_str()))
        .collect();
    let density = matched.len() as f64 / tokens.len().max(1) as f64;
    ActionVerbStats {
        count: matched.len() as u32,
        density,
        examples: matched.iter().take(10).map(|t| t.to_string()).collect(),
    }
}

fn ownership_ratio(tokens: &[String]) -> OwnershipStats {
    let i = tokens.iter().filter(|t| t.as_str() == "i").count() as u32;
    let we = tokens.iter().filter(|t| t.as_str() == "we").count() as u32;
    let total = i + we;
    let i_ratio = if total > 0 {
        f64::from(i) / f64::from(total)
    } else {
        0.5
    };
    OwnershipStats { i, we, i_ratio }
}

fn quantification(text: &str) -> Quantification {
    let mut numbers = lexicon::find_numbers(text);
    numbers.truncate(20);
    let mut time_terms = lexicon::find_terms(text, TIME_TERMS);
    time_terms.truncate(20);
    Quantification {
        has_numbers: !numbers.is_empty(),
        numbers,
        time_terms,
    }
}

fn sentence_stats(text: &str) -> SentenceStats {
    let sentences: Vec<String> = lexicon::split_sentences(text)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return SentenceStats {
            avg_len: 0.0,
            sentences,
        };
    }
    let total_tokens: usize = sentences.iter().map(|s| lexicon::tokenize(s).len()).sum();
    let avg_len = total_tokens as f64 / sentences.len() as f64;
    let mut sentences = sentences;
    sentences.truncate(40);
    SentenceStats { avg_len, sentences }
}

fn star_segments(text: &str, result_score: f64) -> StarSegments {
    let lowered = text.to_lowercase();
    let tags = StarTags {
        s: lexicon::contains_any(&lowered, SITUATION_CUES),
        t: lexicon::contains_any(&lowered, TASK_CUES),
        a: lexicon::contains_any(&lowered, ACTION_CUES),
        r: result_score >= 0.35,
    };
    let coverage = u8::from(tags.s) + u8::from(tags.t) + u8::from(tags.a) + u8::from(tags.r);
    StarSegments { tags, coverage }
}

fn result_strength(text: &str) -> ResultStrength {
    let lowered = text.to_lowercase();
    let sentences = lexicon::split_sentences(text);
    let n = sentences.len().max(1);
    let end_idx = (n as f64 * 0.7).floor() as usize;

    let (cue_hits, cue_total) = lexicon::count_matches(text, RESULT_CUES);
    let cue_score = (f64::from(cue_total) * 0.25).min(1.0);

    let has_numbers = !lexicon::find_numbers(&lowered).is_empty();
    let num_score = if has_numbers { 0.35 } else { 0.0 };

    let end_text = sentences
        .get(end_idx..)
        .unwrap_or(&[])
        .join(" ")
        .to_lowercase();
    let end_hits = END_RESULT_CUES
        .iter()
        .filter(|cue| end_text.contains(*cue))
        .count() as u32;
    let end_score = (f64::from(end_hits) * 0.2).min(0.4);

    ResultStrength {
        score: (cue_score + num_score + end_score).min(1.0),
        details: ResultStrengthDetails {
            cue_hits,
            has_numbers,
            end_hits,
        },
    }
}

fn vagueness(text: &str) -> Vagueness {
    let (hits, total) = lexicon::count_matches(text, VAGUE_PHRASES);
    Vagueness {
        penalty: (f64::from(total) * 0.2).min(0.6),
        hits,
    }
}

fn reflection_presence(text: &str) -> Reflection {
    let (matches, total) = lexicon::count_matches(text, REFLECTION_CUES);
    Reflection {
        has_reflection: !matches.is_empty(),
        phrases: matches.iter().take(3).map(|(term, _)| term.clone()).collect(),
        total,
    }
}

fn lexical_stats(tokens: &[String]) -> LexicalStats {
    if tokens.is_empty() {
        return LexicalStats {
            diversity: 0.0,
            long_ratio: 0.0,
            unique: 0,
        };
    }
    let unique = tokens.iter().collect::<BTreeSet<_>>().len();
    let long_words = tokens.iter().filter(|t| t.chars().count() >= 7).count();
    LexicalStats {
        diversity: unique as f64 / tokens.len() as f64,
        long_ratio: long_words as f64 / tokens.len() as f64,
        unique: unique as u32,
    }
}

fn star_sequence(text: &str) -> StarSequence {
    let lowered = text.to_lowercase();
    let length = lowered.len().max(1) as f64;

    let earliest = |cues: &[&str]| -> Option<f64> {
        cues.iter()
            .filter_map(|cue| lowered.find(cue))
            .min()
            .map(|offset| offset as f64 / length)
    };

    let positions = StarPositions {
        s: earliest(SITUATION_CUES),
        t: earliest(TASK_CUES),
        a: earliest(ACTION_CUES),
        r: earliest(RESULT_CUES),
    };

    let present: Vec<f64> = [positions.s, positions.t, positions.a, positions.r]
        .into_iter()
        .flatten()
        .collect();
    let ordered = present.windows(2).all(|pair| pair[0] < pair[1]);

    StarSequence {
        positions,
        observed: present.len() as u8,
        ordered,
    }
}
