//! Quiz grading for a single module.
//!
//! The score is always measured against every quiz of the module, so leaving
//! questions unanswered costs points. Answers are compared byte for byte.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    model::{
        DatabaseError, ModelManager,
        entity::{Quiz, QuizResult, QuizResultCreate},
    },
    web::AuthenticatedUser,
};

/// Minimal score for a passing attempt.
pub const PASS_THRESHOLD: i32 = 60;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubmittedAnswer {
    pub quiz_id: i64,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub score: i32,
    pub passed: bool,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
}

#[derive(Debug, Error)]
pub enum GradingError {
    #[error("no answers provided")]
    NoAnswers,
    #[error("no quizzes found for module")]
    NoQuizzes,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Grades `answers` against `key` (quiz id to correct answer).
///
/// Only the first answer for a quiz counts, answers for quizzes missing from
/// `key` are ignored. `key` must not be empty.
pub fn grade(answers: &[SubmittedAnswer], key: &HashMap<i64, String>) -> GradeOutcome {
    let total = key.len();
    let mut seen = HashSet::with_capacity(answers.len());
    let mut correct = 0;

    for submitted in answers {
        let Some(expected) = key.get(&submitted.quiz_id) else {
            continue;
        };
        if !seen.insert(submitted.quiz_id) {
            continue;
        }
        if *expected == submitted.answer {
            correct += 1;
        }
    }

    let score = if total == 0 {
        0
    } else {
        (100.0 * correct as f64 / total as f64).round() as i32
    };

    GradeOutcome {
        score,
        passed: score >= PASS_THRESHOLD,
        total,
        correct,
        wrong: total - correct,
    }
}

#[derive(Debug)]
pub struct Submission {
    pub outcome: GradeOutcome,
    pub result: QuizResult,
}

/// Grades a submission of `actor` for `module_id` and records the attempt.
pub async fn submit_quiz(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    module_id: i64,
    answers: &[SubmittedAnswer],
) -> Result<Submission, GradingError> {
    if answers.is_empty() {
        return Err(GradingError::NoAnswers);
    }

    let key: HashMap<i64, String> = Quiz::find_all_by_module(mm, actor, module_id)
        .await?
        .into_iter()
        .map(|quiz| (quiz.id(), quiz.answer().to_string()))
        .collect();

    if key.is_empty() {
        return Err(GradingError::NoQuizzes);
    }

    let outcome = grade(answers, &key);
    debug!(
        module_id,
        user_id = actor.user_id(),
        score = outcome.score,
        "quiz graded"
    );

    let result = QuizResult::create(
        mm,
        actor,
        QuizResultCreate {
            user_id: actor.user_id(),
            module_id,
            score: outcome.score,
            passed: outcome.passed,
        },
    )
    .await?;

    Ok(Submission { outcome, result })
}
