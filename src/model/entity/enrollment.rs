use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: i64,
    user_id: i64,
    course_id: i64,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }
}

impl Enrollment {
    /// Inserts the enrollment unless (user, course) is already enrolled, in
    /// which case `None` is returned and nothing changes.
    pub async fn create_if_absent<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
        course_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO enrollments (user_id, course_id)
            VALUES ($1,$2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    pub async fn exists(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: i64,
        course_id: i64,
    ) -> DatabaseResult<bool> {
        let result: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}
