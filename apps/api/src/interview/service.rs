//! Runs one HTTP round-trip on top of the workflow.
//!
//! start:  workflow.start → persist record → register live session
//! submit: load record → live or rehydrated session (locked) → reload record
//!         and reject if the caller's question is no longer outstanding →
//!         evaluate + next question on a working copy → persist round →
//!         commit copy to the store, or evict on completion
//!
//! A round is all-or-nothing: if any step fails, neither the live session nor
//! the durable record changes and the client can resubmit the same answer.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    Difficulty, Evaluation, InterviewResults, NextQuestion, Progress, QuestionPayload,
};
use crate::interview::rehydrate::reconstruct;
use crate::interview::repository::{InterviewRepository, NewInterview, RoundNext, RoundUpdate};
use crate::interview::session_store::SessionStore;
use crate::interview::workflow::InterviewWorkflow;
use crate::llm_client::TextGenerator;
use crate::models::interview::InterviewRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedInterview {
    pub interview_id: Uuid,
    #[serde(flatten)]
    pub step: StartStep,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StartStep {
    Question(QuestionPayload),
    Completed { completed: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub evaluation: Evaluation,
    pub next_question: Option<QuestionPayload>,
    pub completed: bool,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
}

/// Everything a round needs, borrowed from `AppState`.
pub struct InterviewService<'a> {
    pub repository: &'a dyn InterviewRepository,
    pub sessions: &'a SessionStore,
    pub gateway: Arc<dyn TextGenerator>,
    pub llm_timeout: Duration,
}

impl InterviewService<'_> {
    pub async fn start_interview(
        &self,
        user_id: Uuid,
        role: String,
        difficulty: Difficulty,
    ) -> Result<StartedInterview, AppError> {
        let mut workflow =
            InterviewWorkflow::new(role, difficulty, self.gateway.clone(), self.llm_timeout);
        let first = workflow.start().await?;

        let interview_id = Uuid::new_v4();
        let first_question = match &first {
            NextQuestion::Asked(payload) => Some(payload.question.clone()),
            NextQuestion::Completed => None,
        };
        self.repository
            .create(NewInterview {
                id: interview_id,
                user_id,
                role: workflow.state().role.clone(),
                difficulty,
                first_question,
            })
            .await?;

        let step = match first {
            NextQuestion::Asked(payload) => {
                self.sessions.put(interview_id, workflow);
                StartStep::Question(payload)
            }
            NextQuestion::Completed => StartStep::Completed { completed: true },
        };

        info!("Interview {interview_id} started for user {user_id}");
        Ok(StartedInterview { interview_id, step })
    }

    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
        answer: String,
    ) -> Result<RoundOutcome, AppError> {
        let record = self.load(user_id, interview_id).await?;
        if record.completed {
            return Err(already_completed(interview_id));
        }
        // The question the caller was shown when this request arrived.
        let expected = record.questions.len().saturating_sub(1);

        let slot = self.sessions.get(interview_id).unwrap_or_else(|| {
            self.sessions.get_or_insert_with(interview_id, || {
                info!("Rehydrating interview {interview_id} from storage");
                InterviewWorkflow::from_state(
                    reconstruct(&record),
                    self.gateway.clone(),
                    self.llm_timeout,
                )
            })
        });
        let mut live = slot.lock().await;

        // Another round may have finished while this request waited.
        let current = self.load(user_id, interview_id).await?;
        if current.completed {
            drop(live);
            self.sessions.remove(interview_id);
            return Err(already_completed(interview_id));
        }
        if current.questions.len().saturating_sub(1) != expected {
            return Err(AppError::Conflict(format!(
                "Question {} of interview {interview_id} was already answered",
                expected + 1
            )));
        }
        if live.state().answers.len() != expected {
            warn!("Live session for interview {interview_id} is out of date, rebuilding");
            *live = InterviewWorkflow::from_state(
                reconstruct(&current),
                self.gateway.clone(),
                self.llm_timeout,
            );
        }

        let mut working = live.clone();
        let position = expected as u32;
        let evaluation = working.evaluate_answer(&answer).await?;
        let next = working.generate_next_question().await?;

        let (round_next, next_question) = match next {
            NextQuestion::Asked(payload) => {
                (RoundNext::Question(payload.question.clone()), Some(payload))
            }
            NextQuestion::Completed => (
                RoundNext::Completed {
                    total_score: working.results().total_score,
                },
                None,
            ),
        };
        let total_score = match &round_next {
            RoundNext::Completed { total_score } => Some(*total_score),
            RoundNext::Question(_) => None,
        };

        self.repository
            .record_round(
                interview_id,
                RoundUpdate {
                    position,
                    answer,
                    evaluation: evaluation.clone(),
                    next: round_next,
                },
            )
            .await?;

        let progress = working.progress();
        *live = working;
        drop(live);

        if let Some(score) = total_score {
            self.sessions.remove(interview_id);
            info!("Interview {interview_id} completed with score {score}/10");
        }

        Ok(RoundOutcome {
            evaluation,
            completed: next_question.is_none(),
            next_question,
            progress,
            total_score,
        })
    }

    /// Report computed from the durable record, independent of the live session.
    pub async fn results(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
    ) -> Result<InterviewResults, AppError> {
        let record = self.load(user_id, interview_id).await?;
        Ok(reconstruct(&record).results())
    }

    async fn load(&self, user_id: Uuid, interview_id: Uuid) -> Result<InterviewRecord, AppError> {
        self.repository
            .find_for_user(interview_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
    }
}

fn already_completed(interview_id: Uuid) -> AppError {
    AppError::Conflict(format!("Interview {interview_id} is already completed"))
}
