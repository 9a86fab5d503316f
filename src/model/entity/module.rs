use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: i64,
    course_id: i64,
    title: String,
    content: String,
    pdf_url: Option<String>,
    order_index: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ModuleCreate {
    pub course_id: i64,
    pub title: String,
    pub content: String,
    pub pdf_url: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Default)]
pub struct ModuleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
    pub order_index: Option<i32>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn pdf_url(&self) -> Option<&str> {
        self.pdf_url.as_deref()
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

#[async_trait]
impl CrudRepository<Module, ModuleCreate, ModuleUpdate, i64> for Module {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        let module = sqlx::query_as(
            r#"
            INSERT INTO modules (course_id, title, content, pdf_url, order_index)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.pdf_url)
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleUpdate,
    ) -> DatabaseResult<Self> {
        let module = sqlx::query_as(
            r#"
            UPDATE modules SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                pdf_url = COALESCE($3, pdf_url),
                order_index = COALESCE($4, order_index)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.title)
        .bind(data.content)
        .bind(data.pdf_url)
        .bind(data.order_index)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(module)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM modules ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Module {
    /// Modules of a course by `order_index`, creation order breaking ties.
    pub async fn find_all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT *
            FROM modules m
            WHERE m.course_id = $1
            ORDER BY m.order_index ASC, m.id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_in_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: i64,
        module_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1 AND course_id = $2")
            .bind(module_id)
            .bind(course_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
