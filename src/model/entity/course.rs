use crate::model::access::HasOwner;
use crate::model::entity::order::SUCCESS_STATUSES;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: i64,
    title: String,
    description: String,
    price: i64,
    published: bool,
    instructor_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub instructor_id: i64,
}

#[derive(Debug, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub published: Option<bool>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn published(&self) -> bool {
        self.published
    }

    pub fn instructor_id(&self) -> i64 {
        self.instructor_id
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, CourseUpdate, i64> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses (title, description, price, instructor_id)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.instructor_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseUpdate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            UPDATE courses SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                published = COALESCE($4, published)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.price)
        .bind(data.published)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Course {
    type OwnerId = i64;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.instructor_id)
    }
}

// Utils

impl Course {
    pub async fn list_published(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE published = TRUE ORDER BY id")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_by_instructor(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        instructor_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE instructor_id = $1 ORDER BY id")
            .bind(instructor_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    /// Courses `user_id` holds an enrollment for, oldest enrollment first.
    pub async fn list_enrolled(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT c.*
            FROM courses c
            JOIN enrollments e ON e.course_id = c.id
            WHERE e.user_id = $1
            ORDER BY e.created_at, e.id
            "#,
        )
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}

#[derive(Debug, Serialize, FromRow, utoipa::ToSchema)]
pub struct CourseEarningsRow {
    pub course_id: i64,
    pub course_title: String,
    pub total_enrollment: i64,
    pub total_revenue: i64,
}

impl CourseEarningsRow {
    pub async fn fetch_for_instructor(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        instructor_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.id AS course_id,
                c.title AS course_title,
                (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS total_enrollment,
                (
                    SELECT COALESCE(SUM(o.amount), 0)::BIGINT
                    FROM orders o
                    WHERE o.course_id = c.id AND o.status = ANY($2)
                ) AS total_revenue
            FROM courses c
            WHERE c.instructor_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(instructor_id)
        .bind(&SUCCESS_STATUSES[..])
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
