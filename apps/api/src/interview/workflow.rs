//! Per-session interview state machine.
//!
//! Created → start → QuestionPending → evaluate_answer → Evaluated →
//! generate_next_question → QuestionPending | Completed
//!
//! Every transition calls the gateway first and mutates state only after the
//! call succeeded, so a failed or timed-out call leaves the session exactly as
//! it was.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::interview::formatter::{
    build_evaluation_prompt, build_question_prompt, parse_evaluation, parse_question,
};
use crate::interview::models::{
    AnsweredQuestion, Difficulty, Evaluation, InterviewResults, NextQuestion, Progress,
    QuestionPayload, ResultEntry, MAX_QUESTIONS,
};
use crate::llm_client::prompts::INTERVIEWER_SYSTEM;
use crate::llm_client::{LlmError, TextGenerator};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to generate question: {0}")]
    GenerationFailure(#[source] LlmError),

    #[error("Failed to evaluate answer: {0}")]
    EvaluationFailure(#[source] LlmError),

    #[error("No current question to evaluate")]
    NoActiveQuestion,
}

/// Plain session data. Cloneable so a round can run on a working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewState {
    pub role: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub max_questions: u32,
    pub current_question: Option<String>,
    pub answers: Vec<AnsweredQuestion>,
    pub evaluations: Vec<Evaluation>,
}

impl InterviewState {
    pub fn new(role: impl Into<String>, difficulty: Difficulty, max_questions: u32) -> Self {
        Self {
            role: role.into(),
            difficulty,
            question_count: 0,
            max_questions,
            current_question: None,
            answers: Vec::new(),
            evaluations: Vec::new(),
        }
    }

    /// The question still waiting for an answer, if any.
    ///
    /// `current_question` keeps the last asked text after it is answered; it is
    /// only active while fewer answers than questions exist.
    pub fn pending_question(&self) -> Option<&str> {
        match &self.current_question {
            Some(q) if (self.answers.len() as u32) < self.question_count => Some(q.as_str()),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.question_count >= self.max_questions
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.question_count,
            total: self.max_questions,
            completed: self.is_completed(),
        }
    }

    /// Round-half-up mean of all scores, 0 when nothing was evaluated.
    pub fn total_score(&self) -> u32 {
        let count = self.evaluations.len() as u64;
        if count == 0 {
            return 0;
        }
        let sum: u64 = self.evaluations.iter().map(|e| e.score as u64).sum();
        ((2 * sum + count) / (2 * count)) as u32
    }

    pub fn results(&self) -> InterviewResults {
        InterviewResults {
            questions: self
                .answers
                .iter()
                .zip(&self.evaluations)
                .map(|(a, e)| ResultEntry {
                    question: a.question.clone(),
                    user_answer: a.answer.clone(),
                    evaluation: e.clone(),
                })
                .collect(),
            total_score: self.total_score(),
            completed: self.is_completed(),
        }
    }

    fn asked_questions(&self) -> Vec<String> {
        let mut asked: Vec<String> = self.answers.iter().map(|a| a.question.clone()).collect();
        if let Some(pending) = self.pending_question() {
            asked.push(pending.to_string());
        }
        asked
    }
}

/// A live session: its state plus the gateway it talks to.
#[derive(Clone)]
pub struct InterviewWorkflow {
    state: InterviewState,
    gateway: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl InterviewWorkflow {
    pub fn new(
        role: impl Into<String>,
        difficulty: Difficulty,
        gateway: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self::with_max_questions(role, difficulty, MAX_QUESTIONS, gateway, timeout)
    }

    pub fn with_max_questions(
        role: impl Into<String>,
        difficulty: Difficulty,
        max_questions: u32,
        gateway: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self::from_state(
            InterviewState::new(role, difficulty, max_questions),
            gateway,
            timeout,
        )
    }

    /// Wraps existing state, e.g. one rebuilt from a durable record.
    pub fn from_state(
        state: InterviewState,
        gateway: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            state,
            gateway,
            timeout,
        }
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    /// Asks the first question.
    pub async fn start(&mut self) -> Result<NextQuestion, WorkflowError> {
        info!(
            "Starting interview: role={}, difficulty={}",
            self.state.role, self.state.difficulty
        );
        self.generate_next_question().await
    }

    pub async fn generate_next_question(&mut self) -> Result<NextQuestion, WorkflowError> {
        if self.state.is_completed() {
            debug!(
                "Interview reached {} questions, completing",
                self.state.max_questions
            );
            return Ok(NextQuestion::Completed);
        }

        let prompt = build_question_prompt(
            &self.state.role,
            self.state.difficulty,
            &self.state.asked_questions(),
        );
        let raw = self
            .call_gateway(&prompt)
            .await
            .map_err(WorkflowError::GenerationFailure)?;
        let question = parse_question(&raw)
            .ok_or(WorkflowError::GenerationFailure(LlmError::EmptyContent))?;

        self.state.current_question = Some(question.clone());
        self.state.question_count += 1;

        Ok(NextQuestion::Asked(QuestionPayload {
            question,
            question_number: self.state.question_count,
            total_questions: self.state.max_questions,
        }))
    }

    pub async fn evaluate_answer(&mut self, answer: &str) -> Result<Evaluation, WorkflowError> {
        let question = self
            .state
            .pending_question()
            .ok_or(WorkflowError::NoActiveQuestion)?
            .to_string();

        let prompt = build_evaluation_prompt(
            &question,
            answer,
            &self.state.role,
            self.state.difficulty,
        );
        let raw = self
            .call_gateway(&prompt)
            .await
            .map_err(WorkflowError::EvaluationFailure)?;
        let evaluation = parse_evaluation(&raw);

        self.state.answers.push(AnsweredQuestion {
            question,
            answer: answer.to_string(),
        });
        self.state.evaluations.push(evaluation.clone());

        debug!(
            "Evaluated answer {}/{}: score={}",
            self.state.answers.len(),
            self.state.max_questions,
            evaluation.score
        );
        Ok(evaluation)
    }

    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    pub fn results(&self) -> InterviewResults {
        self.state.results()
    }

    async fn call_gateway(&self, prompt: &str) -> Result<String, LlmError> {
        with_timeout(
            self.timeout,
            self.gateway.generate(prompt, INTERVIEWER_SYSTEM),
        )
        .await
    }
}

async fn with_timeout<F>(limit: Duration, call: F) -> Result<String, LlmError>
where
    F: Future<Output = Result<String, LlmError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!("LLM call exceeded {}s timeout", limit.as_secs());
            Err(LlmError::Timeout)
        }
    }
}
