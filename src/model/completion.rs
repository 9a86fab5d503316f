//! Course completion derived from the latest quiz attempt of every module.

use serde::Serialize;
use sqlx::prelude::FromRow;
use thiserror::Error;

use crate::{
    model::{DatabaseError, ModelManager},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub enum AttemptStatus {
    #[serde(rename = "Not Attempted")]
    NotAttempted,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ModuleStatus {
    pub module_id: i64,
    pub module_title: String,
    pub score: i32,
    pub status: AttemptStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CourseStatus {
    pub total_modules: usize,
    pub passed_modules: usize,
    /// Percentage with two decimals, e.g. `"75.00%"`.
    pub completion_rate: String,
    pub completed: bool,
    pub details: Vec<ModuleStatus>,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no modules found for course")]
    NoModules,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A course module with the newest attempt of one user, if any.
#[derive(Debug, Clone, FromRow)]
pub struct ModuleLatestResultRow {
    pub module_id: i64,
    pub module_title: String,
    pub score: Option<i32>,
    pub passed: Option<bool>,
}

impl ModuleLatestResultRow {
    pub async fn fetch(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: i64,
        user_id: i64,
    ) -> Result<Vec<Self>, DatabaseError> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id AS module_id,
                m.title AS module_title,
                latest.score,
                latest.passed
            FROM modules m
            LEFT JOIN LATERAL (
                SELECT qr.score, qr.passed
                FROM quiz_results qr
                WHERE qr.module_id = m.id AND qr.user_id = $2
                ORDER BY qr.created_at DESC, qr.id DESC
                LIMIT 1
            ) latest ON TRUE
            WHERE m.course_id = $1
            ORDER BY m.order_index ASC, m.id ASC
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

pub fn summarize(rows: Vec<ModuleLatestResultRow>) -> Result<CourseStatus, CompletionError> {
    if rows.is_empty() {
        return Err(CompletionError::NoModules);
    }

    let details: Vec<ModuleStatus> = rows
        .into_iter()
        .map(|row| {
            let status = match row.passed {
                None => AttemptStatus::NotAttempted,
                Some(true) => AttemptStatus::Passed,
                Some(false) => AttemptStatus::Failed,
            };
            ModuleStatus {
                module_id: row.module_id,
                module_title: row.module_title,
                score: row.score.unwrap_or(0),
                status,
            }
        })
        .collect();

    let total_modules = details.len();
    let passed_modules = details
        .iter()
        .filter(|m| m.status == AttemptStatus::Passed)
        .count();
    let rate = passed_modules as f64 / total_modules as f64 * 100.0;

    Ok(CourseStatus {
        total_modules,
        passed_modules,
        completion_rate: format!("{rate:.2}%"),
        completed: passed_modules == total_modules,
        details,
    })
}

/// Completion of `course_id` for `user_id`.
pub async fn course_status(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: i64,
    user_id: i64,
) -> Result<CourseStatus, CompletionError> {
    let rows = ModuleLatestResultRow::fetch(mm, actor, course_id, user_id).await?;
    summarize(rows)
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(module_id: i64, latest: Option<(i32, bool)>) -> ModuleLatestResultRow {
        ModuleLatestResultRow {
            module_id,
            module_title: format!("Module {module_id}"),
            score: latest.map(|(s, _)| s),
            passed: latest.map(|(_, p)| p),
        }
    }

    #[test]
    fn partial_completion_test() {
        let rows = vec![
            row(1, Some((80, true))),
            row(2, Some((60, true))),
            row(3, Some((100, true))),
            row(4, None),
        ];
        let status = summarize(rows).unwrap();
        assert_eq!(status.total_modules, 4);
        assert_eq!(status.passed_modules, 3);
        assert_eq!(status.completion_rate, "75.00%");
        assert!(!status.completed);
        assert_eq!(status.details[3].status, AttemptStatus::NotAttempted);
        assert_eq!(status.details[3].score, 0);
    }

    #[test]
    fn failed_latest_attempt_test() {
        let status = summarize(vec![row(1, Some((40, false))), row(2, Some((90, true)))]).unwrap();
        assert_eq!(status.details[0].status, AttemptStatus::Failed);
        assert_eq!(status.details[0].score, 40);
        assert_eq!(status.completion_rate, "50.00%");
        assert!(!status.completed);
    }

    #[test]
    fn full_completion_test() {
        let status = summarize(vec![row(7, Some((60, true)))]).unwrap();
        assert!(status.completed);
        assert_eq!(status.completion_rate, "100.00%");
    }

    #[test]
    fn third_rate_test() {
        let rows = vec![row(1, Some((100, true))), row(2, None), row(3, None)];
        assert_eq!(summarize(rows).unwrap().completion_rate, "33.33%");
    }

    #[test]
    fn module_order_kept_test() {
        let status = summarize(vec![row(3, None), row(1, None), row(2, None)]).unwrap();
        let ids: Vec<_> = status.details.iter().map(|m| m.module_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn no_modules_test() {
        assert!(matches!(summarize(vec![]), Err(CompletionError::NoModules)));
    }

    #[test]
    fn status_serialization_test() {
        assert_eq!(
            serde_json::to_string(&AttemptStatus::NotAttempted).unwrap(),
            "\"Not Attempted\""
        );
        assert_eq!(
            serde_json::to_string(&AttemptStatus::Passed).unwrap(),
            "\"Passed\""
        );
    }
}
