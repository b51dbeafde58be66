//! Durable interview storage.
//!
//! `AppState` holds an `Arc<dyn InterviewRepository>`; production uses
//! `PgInterviewRepository`.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{Difficulty, Evaluation};
use crate::models::interview::{
    InterviewQuestionRow, InterviewRecord, InterviewRow, InterviewSummary, QuestionRecord,
};

/// Everything needed to create the durable record for a new interview.
#[derive(Debug, Clone)]
pub struct NewInterview {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub difficulty: Difficulty,
    /// `None` only for an interview that is complete on creation.
    pub first_question: Option<String>,
}

/// What happens after the answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundNext {
    Question(String),
    Completed { total_score: u32 },
}

/// One finished round: the answer and evaluation for the question at
/// `position`, plus what follows it.
#[derive(Debug, Clone)]
pub struct RoundUpdate {
    pub position: u32,
    pub answer: String,
    pub evaluation: Evaluation,
    pub next: RoundNext,
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn create(&self, new: NewInterview) -> Result<InterviewRecord, AppError>;

    /// Returns `None` when the interview does not exist or belongs to someone else.
    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRecord>, AppError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InterviewSummary>, AppError>;

    /// Applies a round atomically.
    async fn record_round(&self, id: Uuid, round: RoundUpdate) -> Result<(), AppError>;
}

pub struct PgInterviewRepository {
    pool: PgPool,
}

impl PgInterviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewRepository for PgInterviewRepository {
    async fn create(&self, new: NewInterview) -> Result<InterviewRecord, AppError> {
        let completed = new.first_question.is_none();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            INSERT INTO interviews (id, user_id, role, difficulty, completed, completed_at)
            VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 THEN NOW() ELSE NULL END)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(&new.role)
        .bind(new.difficulty.as_str())
        .bind(completed)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(question) = &new.first_question {
            insert_question(&mut tx, new.id, 0, question).await?;
        }

        tx.commit().await?;
        info!("Created interview {} for user {}", new.id, new.user_id);

        let questions = new
            .first_question
            .into_iter()
            .map(|question| QuestionRecord {
                question,
                user_answer: None,
                evaluation: None,
            })
            .collect();
        to_record(row, questions)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRecord>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, InterviewQuestionRow>(
            "SELECT * FROM interview_questions WHERE interview_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|q| QuestionRecord {
            evaluation: q.evaluation(),
            question: q.question,
            user_answer: q.user_answer,
        })
        .collect();

        to_record(row, questions).map(Some)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InterviewSummary>, AppError> {
        let summaries = sqlx::query_as::<_, InterviewSummary>(
            r#"
            SELECT i.id, i.role, i.difficulty, i.total_score, i.completed,
                   COUNT(q.id) AS question_count, i.created_at, i.completed_at
            FROM interviews i
            LEFT JOIN interview_questions q ON q.interview_id = i.id
            WHERE i.user_id = $1
            GROUP BY i.id
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    async fn record_round(&self, id: Uuid, round: RoundUpdate) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE interview_questions
            SET user_answer = $1, score = $2, feedback = $3, recommendations = $4
            WHERE interview_id = $5 AND position = $6 AND user_answer IS NULL
            "#,
        )
        .bind(&round.answer)
        .bind(round.evaluation.score as i32)
        .bind(&round.evaluation.feedback)
        .bind(&round.evaluation.recommendations)
        .bind(id)
        .bind(round.position as i32)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated != 1 {
            return Err(AppError::Conflict(format!(
                "Question {} of interview {id} is not awaiting an answer",
                round.position + 1
            )));
        }

        match &round.next {
            RoundNext::Question(question) => {
                insert_question(&mut tx, id, round.position + 1, question).await?;
                sqlx::query("UPDATE interviews SET updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            RoundNext::Completed { total_score } => {
                sqlx::query(
                    r#"
                    UPDATE interviews
                    SET completed = TRUE, total_score = $1, completed_at = NOW(), updated_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(*total_score as i32)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn insert_question(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    interview_id: Uuid,
    position: u32,
    question: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO interview_questions (id, interview_id, position, question) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(interview_id)
    .bind(position as i32)
    .bind(question)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn to_record(
    row: InterviewRow,
    questions: Vec<QuestionRecord>,
) -> Result<InterviewRecord, AppError> {
    let difficulty = row
        .difficulty
        .parse::<Difficulty>()
        .map_err(|e| AppError::Internal(anyhow!("Interview {} has {e}", row.id)))?;

    Ok(InterviewRecord {
        id: row.id,
        user_id: row.user_id,
        role: row.role,
        difficulty,
        questions,
        total_score: row.total_score.max(0) as u32,
        completed: row.completed,
        created_at: row.created_at,
        completed_at: row.completed_at,
    })
}
