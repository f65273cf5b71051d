//! Fixed term lists and the text primitives every detector is built on.
//!
//! Matching is deliberately simple: lowercase the transcript once, then scan
//! for substring occurrences. [`count_matches`] respects word boundaries so a
//! term never matches inside a longer word; rubric keyword checks use plain
//! substring containment, mirroring how the cue phrases were tuned.

/// Disfluency words and phrases.
pub const FILLERS: &[&str] = &[
    "um", "uh", "er", "ah", "like", "you know", "kind of", "kinda", "sort of", "actually",
    "basically", "literally", "so yeah", "i mean",
];

/// Uncertainty-softening words and phrases.
pub const HEDGES: &[&str] = &[
    "maybe",
    "perhaps",
    "probably",
    "possibly",
    "i think",
    "i guess",
    "i believe",
    "i feel like",
    "sort of",
    "kind of",
    "somewhat",
    "a bit",
    "might",
    "could",
    "not sure",
    "to be honest",
    "i suppose",
];

pub const ACTION_VERBS: &[&str] = &[
    "built",
    "implemented",
    "designed",
    "led",
    "drove",
    "optimized",
    "reduced",
    "increased",
    "launched",
    "migrated",
    "refactored",
    "debugged",
    "delivered",
    "automated",
    "integrated",
    "owned",
    "shipped",
    "deployed",
    "scaled",
    "mentored",
    "verified",
    "configured",
    "reconfigured",
    "reproduced",
    "benchmarked",
    "profiled",
    "triaged",
    "isolated",
    "documented",
];

pub const RESULT_CUES: &[&str] = &[
    "as a result",
    "resulted in",
    "so that",
    "thereby",
    "which led to",
    "leading to",
    "therefore",
    "ultimately",
    "in the end",
    "the outcome",
    "this helped",
    "this enabled",
    "we were able to",
    "users could",
    "the system could",
    "confirmed on the",
    "successfully",
    "we succeeded",
    "we achieved",
    "earned recognition",
    "unblocked",
    "fixed the issue",
    "resolved the issue",
    "passed tests",
    "met the goal",
    "met our goal",
];

pub const SITUATION_CUES: &[&str] = &[
    "at my internship",
    "at school",
    "on a project",
    "the situation",
    "the context",
    "when i",
    "while i",
    "our team was",
    "we were",
    "the problem was",
    "we faced",
    "one challenge",
];

pub const TASK_CUES: &[&str] = &[
    "my task",
    "i needed to",
    "i had to",
    "i was responsible for",
    "the goal was",
    "the objective was",
    "we needed to",
    "we had to",
];

pub const ACTION_CUES: &[&str] = &[
    "so i",
    "i decided to",
    "i started by",
    "i then",
    "i worked on",
    "i implemented",
    "we implemented",
    "i built",
    "we built",
    "i designed",
    "we designed",
    "i verified",
    "i debugged",
];

pub const REFLECTION_CUES: &[&str] = &[
    "i learned",
    "i realised",
    "i realized",
    "what i learned",
    "this taught me",
    "i would",
    "next time",
    "going forward",
    "i now",
    "i took away",
    "i discovered",
    "i will",
    "we learned",
    "lesson",
    "key takeaway",
];

pub const VAGUE_PHRASES: &[&str] = &[
    "some things",
    "stuff",
    "things",
    "technical issues",
    "it started working",
    "figured it out",
    "googling",
    "okay in the end",
    "tough but managed",
    "sort of worked",
    "kind of worked",
    "did some research",
    "did research",
];

/// Outcome words that carry extra weight when they land near the end of the
/// answer.
pub const END_RESULT_CUES: &[&str] = &[
    "users could",
    "successfully",
    "enabled",
    "reduced",
    "increased",
    "confirmed",
    "recognized",
    "passed",
    "fixed",
    "resolved",
    "unblocked",
    "achieved",
];

/// Blame-shifting phrases penalized in behavioral answers.
pub const BLAME_PHRASES: &[&str] = &[
    "their fault",
    "they messed up",
    "i blamed",
    "they were wrong",
    "they failed",
];

// Topical vocabularies used by the technical and system-design rubrics.
pub const REQUIREMENTS_TERMS: &[&str] = &[
    "requirement",
    "constraint",
    "goal",
    "scope",
    "assumption",
    "require",
    "must",
];
pub const TRADEOFF_TERMS: &[&str] = &[
    "trade-off",
    "tradeoff",
    "cost",
    "latency",
    "throughput",
    "consistency",
    "availability",
];
pub const RELIABILITY_TERMS: &[&str] = &[
    "retry",
    "timeout",
    "failover",
    "monitoring",
    "alert",
    "observability",
    "resilient",
    "fallback",
];
pub const EDGE_TERMS: &[&str] = &["edge case", "failure", "error", "bug", "exception", "rollback"];
pub const COMPLEXITY_TERMS: &[&str] = &[
    "big o",
    "complexity",
    "runtime",
    "memory",
    "space",
    "efficient",
    "performance",
];
pub const SCALING_TERMS: &[&str] = &[
    "scale", "shard", "partition", "load", "cache", "queue", "cdn", "replica",
];
pub const DATA_TERMS: &[&str] = &["schema", "table", "index", "data model", "storage", "database"];
pub const API_TERMS: &[&str] = &[
    "api",
    "endpoint",
    "request",
    "response",
    "contract",
    "versioning",
];

/// Duration nouns counted by the quantification detector.
pub const TIME_TERMS: &[&str] = &[
    "day", "days", "week", "weeks", "month", "months", "quarter", "quarters", "year", "years",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "this", "that", "these", "those", "to",
    "of", "in", "on", "for", "with", "by", "from", "about", "as", "at", "into", "is", "are", "was",
    "were", "be", "been", "being", "it", "its", "i", "we", "you", "my", "our", "your", "they",
    "their", "them", "he", "she", "his", "her", "how", "what", "why", "when", "where", "who",
    "which",
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_token_char(c: char) -> bool {
    is_word_char(c) || c == '\'' || c == '-'
}

/// Lowercase the text and extract word-like tokens: maximal runs of letters,
/// digits, apostrophes, and hyphens, trimmed of leading/trailing punctuation.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in lowered.chars() {
        if is_token_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            push_token(&mut tokens, &mut current);
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, &mut current);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim_matches(|c| c == '\'' || c == '-');
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
    current.clear();
}

/// Split on sentence-ending punctuation followed by whitespace. The
/// punctuation stays with the sentence it closes.
pub fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Count non-overlapping, word-boundary-respecting occurrences of each term.
/// Returns `(term, count)` pairs for terms with at least one hit, in lexicon
/// order, plus the grand total.
pub fn count_matches(text: &str, terms: &[&str]) -> (Vec<(String, u32)>, u32) {
    let lowered = text.to_lowercase();
    let mut hits = Vec::new();
    let mut total = 0;
    for term in terms {
        let count = count_term(&lowered, term);
        if count > 0 {
            hits.push((term.to_string(), count));
            total += count;
        }
    }
    (hits, total)
}

fn count_term(haystack: &str, term: &str) -> u32 {
    let mut count = 0;
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(term) {
        let begin = from + offset;
        let end = begin + term.len();
        let left_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let right_ok = haystack[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if left_ok && right_ok {
            count += 1;
            from = end;
        } else {
            // step past one char, staying on a UTF-8 boundary
            from = begin
                + haystack[begin..]
                    .chars()
                    .next()
                    .map_or(1, |c| c.len_utf8());
        }
    }
    count
}

/// Substring containment over an already-lowercased haystack. Rubric keyword
/// sets and STAR cues match this way on purpose.
pub fn contains_any(lowered: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| lowered.contains(term))
}

/// Topical signal over the raw transcript.
pub fn keyword_signal(text: &str, terms: &[&str]) -> bool {
    contains_any(&text.to_lowercase(), terms)
}

/// Numeric tokens in text order: optional `$`, digits, optional decimals,
/// optional trailing `%`, bounded by non-word characters on both sides.
/// The fraction and the `%` are dropped again when a word character follows,
/// so "$4.5M" yields "$4" and "1.2s" yields "1".
pub fn find_numbers(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if i > 0 && is_word_char(chars[i - 1]) {
            i += 1;
            continue;
        }
        let mut j = i;
        if chars.get(j) == Some(&'$') {
            j += 1;
        }
        let digits_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j == digits_start {
            i += 1;
            continue;
        }
        let digits_end = j;
        // fractional part only when at least one digit follows the dot
        if chars.get(j) == Some(&'.') && chars.get(j + 1).is_some_and(|c| c.is_ascii_digit()) {
            j += 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
        }
        let fraction_end = j;
        if chars.get(j) == Some(&'%') {
            j += 1;
        }
        // longest end first, then without the %, then the bare digits
        let mut ends = vec![j];
        if j > fraction_end {
            ends.push(fraction_end);
        }
        if fraction_end > digits_end {
            ends.push(digits_end);
        }
        let accepted = ends
            .into_iter()
            .find(|&end| chars.get(end).map_or(true, |c| !is_word_char(*c)));
        match accepted {
            Some(end) => {
                found.push(chars[i..end].iter().collect());
                i = end.max(i + 1);
            }
            None => i += 1,
        }
    }
    found
}

/// Matched terms in text order, echoed as written in the input (used for
/// duration nouns).
pub fn find_terms(text: &str, terms: &[&str]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let left_ok = i == 0 || !is_word_char(chars[i - 1]);
        if left_ok {
            // longest term first so "days" is not reported as "day"
            let mut best: Option<&str> = None;
            for term in terms {
                if term_matches_at(&chars, i, term) && best.map_or(true, |b| term.len() > b.len()) {
                    best = Some(term);
                }
            }
            if let Some(term) = best {
                let consumed = term.chars().count();
                found.push(chars[i..i + consumed].iter().collect());
                i += consumed;
                continue;
            }
        }
        i += 1;
    }
    found
}

fn term_matches_at(chars: &[char], at: usize, term: &str) -> bool {
    let mut i = at;
    for expected in term.chars() {
        match chars.get(i) {
            Some(c) if c.eq_ignore_ascii_case(&expected) => i += 1,
            _ => return false,
        }
    }
    chars.get(i).map_or(true, |c| !is_word_char(*c))
}

/// Top non-stopword tokens of a prompt, deduplicated in order of first
/// appearance. Feeds the question-adaptive part of each rubric.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokenize(text) {
        if token.len() <= 2 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        if !keywords.contains(&token) {
            keywords.push(token);
            if keywords.len() >= limit {
                break;
            }
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_contractions_and_hyphens() {
        let tokens = tokenize("I didn't re-run the job.");
        assert_eq!(tokens, vec!["i", "didn't", "re-run", "the", "job"]);
    }

    #[test]
    fn split_sentences_breaks_on_terminal_punctuation() {
        let sentences = split_sentences("We shipped it. Usage grew 40%! Then what?");
        assert_eq!(
            sentences,
            vec!["We shipped it.", "Usage grew 40%!", "Then what?"]
        );
    }

    #[test]
    fn split_sentences_ignores_decimal_points() {
        let sentences = split_sentences("Latency fell to 3.5 seconds. Done.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Latency fell to 3.5 seconds.");
    }

    #[test]
    fn count_matches_respects_word_boundaries() {
        let (hits, total) = count_matches("Um, the umbrella was, um, wet.", &["um"]);
        assert_eq!(hits, vec![("um".to_string(), 2)]);
        assert_eq!(total, 2);
    }

    #[test]
    fn count_matches_handles_multi_word_terms() {
        let (hits, total) = count_matches("You know, it was fine, you know.", &["you know"]);
        assert_eq!(hits, vec![("you know".to_string(), 2)]);
        assert_eq!(total, 2);
    }

    #[test]
    fn find_numbers_detects_currency_percent_and_decimals() {
        let numbers = find_numbers("Saved $400 and cut errors by 12.5% in 3 weeks.");
        assert_eq!(numbers, vec!["$400", "12.5%", "3"]);
    }

    #[test]
    fn find_numbers_skips_embedded_digits() {
        // "v2" must not match: the digit is preceded by a word char
        assert_eq!(find_numbers("rolled out v2 everywhere"), Vec::<String>::new());
    }

    #[test]
    fn find_numbers_drops_the_fraction_before_a_unit_suffix() {
        assert_eq!(find_numbers("we saved $4.5M overall"), vec!["$4"]);
        assert_eq!(find_numbers("latency fell to 1.2s"), vec!["1"]);
        assert_eq!(find_numbers("throughput grew 3.5x"), vec!["3"]);
    }

    #[test]
    fn find_numbers_drops_the_percent_before_a_unit_suffix() {
        assert_eq!(find_numbers("a 40%ish improvement"), vec!["40"]);
    }

    #[test]
    fn find_numbers_splits_on_thousands_separators() {
        // the comma is a boundary, not part of the number
        assert_eq!(find_numbers("handled 1,200 requests"), vec!["1", "200"]);
    }

    #[test]
    fn find_terms_prefers_longest_match() {
        let terms = find_terms("It took two weeks and one day.", TIME_TERMS);
        assert_eq!(terms, vec!["weeks", "day"]);
    }

    #[test]
    fn find_terms_echoes_the_input_casing() {
        let terms = find_terms("Delivered in 3 Weeks, one QUARTER early.", TIME_TERMS);
        assert_eq!(terms, vec!["Weeks", "QUARTER"]);
    }

    #[test]
    fn extract_keywords_drops_stopwords_and_short_tokens() {
        let keywords = extract_keywords("Tell me about a challenge you faced at work", 8);
        assert_eq!(keywords, vec!["tell", "challenge", "faced", "work"]);
    }
}
