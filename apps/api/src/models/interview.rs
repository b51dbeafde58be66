use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::models::{Difficulty, Evaluation};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub difficulty: String,
    pub total_score: i32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewQuestionRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub position: i32,
    pub question: String,
    pub user_answer: Option<String>,
    pub score: Option<i32>,
    pub feedback: Option<String>,
    pub recommendations: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InterviewQuestionRow {
    /// Rows only carry an evaluation once the score column is filled.
    pub fn evaluation(&self) -> Option<Evaluation> {
        self.score.map(|score| Evaluation {
            score: score.clamp(0, 10) as u32,
            feedback: self.feedback.clone().unwrap_or_default(),
            recommendations: self.recommendations.clone().unwrap_or_default(),
        })
    }
}

/// Durable projection of an interview session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuestionRecord>,
    pub total_score: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub user_answer: Option<String>,
    pub evaluation: Option<Evaluation>,
}

/// Row shape for the history listing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummary {
    pub id: Uuid,
    pub role: String,
    pub difficulty: String,
    pub total_score: i32,
    pub completed: bool,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
