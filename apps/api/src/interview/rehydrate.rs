//! Rebuilds workflow state from a durable record after the live session was
//! lost (process restart, eviction).

use crate::interview::models::{AnsweredQuestion, MAX_QUESTIONS};
use crate::interview::workflow::InterviewState;
use crate::models::interview::InterviewRecord;

/// Replays a persisted interview into the state a never-evicted workflow
/// would hold at the same point.
///
/// One question is generated per persisted entry, so `question_count` is the
/// number of entries. Only entries carrying both an answer and an evaluation
/// count as completed rounds, which keeps `answers` and `evaluations`
/// index-aligned.
pub fn reconstruct(record: &InterviewRecord) -> InterviewState {
    let (answers, evaluations) = record
        .questions
        .iter()
        .filter_map(|q| match (&q.user_answer, &q.evaluation) {
            (Some(answer), Some(evaluation)) => Some((
                AnsweredQuestion {
                    question: q.question.clone(),
                    answer: answer.clone(),
                },
                evaluation.clone(),
            )),
            _ => None,
        })
        .unzip();

    InterviewState {
        role: record.role.clone(),
        difficulty: record.difficulty,
        question_count: record.questions.len() as u32,
        max_questions: MAX_QUESTIONS,
        current_question: record.questions.last().map(|q| q.question.clone()),
        answers,
        evaluations,
    }
}
