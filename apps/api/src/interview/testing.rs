//! Test doubles for the gateway and the durable store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::repository::{InterviewRepository, NewInterview, RoundNext, RoundUpdate};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::interview::{InterviewRecord, InterviewSummary, QuestionRecord};

/// Replies with queued responses in order; fails once the script runs out.
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    hang: bool,
}

impl ScriptedGateway {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    /// A gateway whose calls never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGateway {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        // Let concurrent requests interleave the way a network call would.
        tokio::task::yield_now().await;
        if self.hang {
            std::future::pending::<()>().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.ok_or_else(|| LlmError::Api {
            status: 503,
            message: "script exhausted".to_string(),
        })
    }
}

/// Keeps records in a map; mirrors the ownership and ordering rules of the
/// Postgres repository.
#[derive(Default)]
pub struct InMemoryInterviewRepository {
    records: Mutex<HashMap<Uuid, InterviewRecord>>,
    stale: Mutex<Option<InterviewRecord>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryInterviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: InterviewRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn get(&self, id: Uuid) -> Option<InterviewRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// The next lookup returns `record` instead of the stored state, as a read
    /// that raced with another writer would.
    pub fn serve_stale_once(&self, record: InterviewRecord) {
        *self.stale.lock().unwrap() = Some(record);
    }

    /// Makes subsequent writes fail as if the database were down.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if *self.fail_writes.lock().unwrap() {
            Err(AppError::Internal(anyhow::anyhow!("database unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn create(&self, new: NewInterview) -> Result<InterviewRecord, AppError> {
        self.check_writable()?;
        let now = Utc::now();
        let completed = new.first_question.is_none();
        let record = InterviewRecord {
            id: new.id,
            user_id: new.user_id,
            role: new.role,
            difficulty: new.difficulty,
            questions: new
                .first_question
                .into_iter()
                .map(|question| QuestionRecord {
                    question,
                    user_answer: None,
                    evaluation: None,
                })
                .collect(),
            total_score: 0,
            completed,
            created_at: now,
            completed_at: completed.then_some(now),
        };
        self.insert(record.clone());
        Ok(record)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRecord>, AppError> {
        let stale = self.stale.lock().unwrap().take();
        let record = stale.filter(|r| r.id == id).or_else(|| self.get(id));
        Ok(record.filter(|r| r.user_id == user_id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InterviewSummary>, AppError> {
        let mut summaries: Vec<InterviewSummary> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| InterviewSummary {
                id: r.id,
                role: r.role.clone(),
                difficulty: r.difficulty.as_str().to_string(),
                total_score: r.total_score as i32,
                completed: r.completed,
                question_count: r.questions.len() as i64,
                created_at: r.created_at,
                completed_at: r.completed_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn record_round(&self, id: Uuid, round: RoundUpdate) -> Result<(), AppError> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

        let slot = record
            .questions
            .get_mut(round.position as usize)
            .filter(|q| q.user_answer.is_none())
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Question {} of interview {id} is not awaiting an answer",
                    round.position + 1
                ))
            })?;
        slot.user_answer = Some(round.answer);
        slot.evaluation = Some(round.evaluation);

        match round.next {
            RoundNext::Question(question) => record.questions.push(QuestionRecord {
                question,
                user_answer: None,
                evaluation: None,
            }),
            RoundNext::Completed { total_score } => {
                record.completed = true;
                record.total_score = total_score;
                record.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
