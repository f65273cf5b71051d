use crate::infra::load_history_file;
use clap::Args;
use interview_coach::error::AppError;
use interview_coach::scoring::{ScoringEngine, ScoringResult};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a plain-text transcript file
    #[arg(long)]
    pub(crate) transcript: PathBuf,
    /// The interview question the transcript answers
    #[arg(long)]
    pub(crate) question: String,
    /// Spoken duration of the answer in seconds
    #[arg(long)]
    pub(crate) duration_seconds: f64,
    /// Optional JSON file holding an array of prior attempts
    #[arg(long)]
    pub(crate) history: Option<PathBuf>,
    /// Optional question id, used as a hint for mode inference
    #[arg(long)]
    pub(crate) question_id: Option<String>,
    /// Emit the full result as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Emit the full result as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        transcript,
        question,
        duration_seconds,
        history,
        question_id,
        json,
    } = args;

    let transcript = std::fs::read_to_string(transcript)?;
    let history = match history {
        Some(path) => load_history_file(&path)?,
        None => Vec::new(),
    };

    let engine = ScoringEngine::default();
    let result = engine.score(
        &transcript,
        &question,
        duration_seconds,
        &history,
        question_id.as_deref(),
    );

    emit(&result, json)
}

const DEMO_QUESTION: &str = "Tell me about a time you handled a production incident.";

const DEMO_ANSWER: &str = "At my last job our payment service went down during a flash sale. \
My task was to restore it quickly while keeping the support team informed. So I led the \
incident call, profiled the service, and rolled back the bad deploy after verifying the diff. \
As a result we recovered in 18 minutes and the error rate dropped to zero. Afterwards I \
learned to stage risky rollouts, and I wrote the runbook the team still uses.";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Interview answer scoring demo");
    println!("Question: {DEMO_QUESTION}");
    println!("Answer: {DEMO_ANSWER}\n");

    let engine = ScoringEngine::default();
    let result = engine.score(DEMO_ANSWER, DEMO_QUESTION, 105.0, &[], None);
    emit(&result, args.json)
}

fn emit(result: &ScoringResult, json: bool) -> Result<(), AppError> {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("result unavailable: {err}"),
        }
        return Ok(());
    }
    render_report(result);
    Ok(())
}

fn render_report(result: &ScoringResult) {
    println!(
        "Overall score: {:.1} ({} mode)",
        result.overall_score,
        result.question_alignment.mode.label()
    );

    println!("\nSubscores");
    println!("- structure: {:.1}", result.subscores.structure);
    println!("- relevance: {:.1}", result.subscores.relevance);
    println!("- clarity: {:.1}", result.subscores.clarity);
    println!("- conciseness: {:.1}", result.subscores.conciseness);
    println!("- delivery: {:.1}", result.subscores.delivery);
    println!("- technical: {:.1}", result.subscores.technical);

    if result.issues.is_empty() {
        println!("\nIssues: none");
    } else {
        println!("\nIssues");
        for issue in &result.issues {
            println!("- {}", issue.fix_suggestion);
            if !issue.evidence_snippet.is_empty() {
                println!("  evidence: {}", issue.evidence_snippet);
            }
        }
    }

    if !result.strengths.is_empty() {
        println!("\nStrengths");
        for strength in &result.strengths {
            println!("- {strength}");
        }
    }

    if !result.suggestions.is_empty() {
        println!("\nSuggestions");
        for suggestion in &result.suggestions {
            println!("- {suggestion}");
        }
    }

    let summary = &result.history_summary;
    if summary.attempt_count > 0 {
        println!("\nAgainst your last attempt");
        if let Some(delta) = summary.delta_total {
            println!("- total: {delta:+.1}");
        }
        if let Some(delta) = summary.metric_deltas.fillers_per_100w {
            println!("- fillers per 100 words: {delta:+.2}");
        }
        if let Some(delta) = summary.metric_deltas.wpm {
            println!("- words per minute: {delta:+.2}");
        }
        if !summary.persisting_flags.is_empty() {
            let flags: Vec<String> = summary
                .persisting_flags
                .iter()
                .map(|flag| format!("{flag:?}"))
                .collect();
            println!("- still flagged: {}", flags.join(", "));
        }
    }

    println!(
        "\nSignals: {:.0} wpm | STAR coverage {}/4 | result strength {:.2} | {:.2} fillers/100w",
        result.explain.signals.wpm,
        result.explain.signals.star_coverage,
        result.explain.signals.result_strength,
        result.explain.signals.filler_rate
    );
}
