use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of rounds in every interview.
pub const MAX_QUESTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(alias = "beginner")]
    Beginner,
    #[serde(alias = "intermediate")]
    Intermediate,
    #[serde(alias = "advanced")]
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Scored feedback for one answer. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0 – 10
    pub score: u32,
    pub feedback: String,
    pub recommendations: String,
}

/// One completed round as the workflow remembers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
}

/// Returned whenever a new question has been asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub question: String,
    pub question_number: u32,
    pub total_questions: u32,
}

/// Outcome of asking for the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextQuestion {
    Asked(QuestionPayload),
    Completed,
}

#[cfg(test)]
impl NextQuestion {
    pub fn is_completed(&self) -> bool {
        matches!(self, NextQuestion::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub question: String,
    pub user_answer: String,
    pub evaluation: Evaluation,
}

/// The end-of-interview report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewResults {
    pub questions: Vec<ResultEntry>,
    pub total_score: u32,
    pub completed: bool,
}
