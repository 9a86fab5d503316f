use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// One grading attempt. Rows are only ever inserted, the newest row for a
/// (user, module) pair is the current result.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizResult {
    id: i64,
    user_id: i64,
    module_id: i64,
    score: i32,
    passed: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QuizResultCreate {
    pub user_id: i64,
    pub module_id: i64,
    pub score: i32,
    pub passed: bool,
}

impl ResourceTyped for QuizResult {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizResult
    }
}

impl QuizResult {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn module_id(&self) -> i64 {
        self.module_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

impl QuizResult {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizResultCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO quiz_results (user_id, module_id, score, passed)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.module_id)
        .bind(data.score)
        .bind(data.passed)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    /// Whole attempt history of `user_id` for the modules of a course, newest first.
    pub async fn find_all_by_user_and_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: i64,
        course_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT qr.*
            FROM quiz_results qr
            JOIN modules m ON m.id = qr.module_id
            WHERE m.course_id = $1 AND qr.user_id = $2
            ORDER BY qr.created_at DESC, qr.id DESC
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
