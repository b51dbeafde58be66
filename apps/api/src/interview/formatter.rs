//! Prompt building and response parsing. Pure text in, text or `Evaluation` out.
//!
//! Parsing never fails on malformed model output: missing sections degrade to
//! defaults (score 0, empty strings).

use std::sync::OnceLock;

use regex::Regex;

use crate::interview::models::{Difficulty, Evaluation};
use crate::interview::prompts::{
    EVALUATION_PROMPT_TEMPLATE, NO_PREVIOUS_QUESTIONS, QUESTION_PROMPT_TEMPLATE,
};

const MAX_SCORE: u32 = 10;

pub fn build_question_prompt(
    role: &str,
    difficulty: Difficulty,
    asked_questions: &[String],
) -> String {
    let asked = if asked_questions.is_empty() {
        NO_PREVIOUS_QUESTIONS.to_string()
    } else {
        asked_questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q))
            .collect::<Vec<_>>()
            .join("\n")
    };

    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("difficulty", difficulty.as_str()),
            ("role", role),
            ("asked_questions", &asked),
        ],
    )
}

pub fn build_evaluation_prompt(
    question: &str,
    answer: &str,
    role: &str,
    difficulty: Difficulty,
) -> String {
    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("role", role),
            ("difficulty", difficulty.as_str()),
            ("question", question),
            ("answer", answer),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template, so braces
/// inside substituted values are left as they are. Unknown names stay verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"));

    re.replace_all(template, |caps: &regex::Captures<'_>| {
        values
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Cleans a generated question. Returns `None` when nothing usable remains.
pub fn parse_question(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    for label in ["Question:", "question:", "QUESTION:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim_start();
        }
    }
    let text = text
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)SCORE:\s*(\d+)").expect("valid score regex"))
}

fn feedback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)FEEDBACK:\s*(.*?)(?:RECOMMENDATIONS:|\z)").expect("valid feedback regex")
    })
}

fn recommendations_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)RECOMMENDATIONS:\s*(.*)").expect("valid recommendations regex")
    })
}

pub fn parse_evaluation(raw: &str) -> Evaluation {
    let score = score_re()
        .captures(raw)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|s| s.min(MAX_SCORE))
        .unwrap_or(0);

    let section = |re: &Regex| {
        re.captures(raw)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default()
    };

    Evaluation {
        score,
        feedback: section(feedback_re()),
        recommendations: section(recommendations_re()),
    }
}
