use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use thiserror::Error;

/// Every quiz question carries exactly this many options.
pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: i64,
    module_id: i64,
    question: String,
    #[schema(value_type = Vec<String>)]
    options: Json<Vec<String>>,
    answer: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QuizCreate {
    pub module_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Default)]
pub struct QuizUpdate {
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub answer: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum QuizDraftError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("must have exactly {} options, got {}", QUIZ_OPTION_COUNT, .0)]
    OptionCount(usize),
    #[error("missing answer")]
    EmptyAnswer,
}

impl QuizCreate {
    pub fn validate(&self) -> Result<(), QuizDraftError> {
        if self.question.trim().is_empty() {
            return Err(QuizDraftError::EmptyQuestion);
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(QuizDraftError::OptionCount(self.options.len()));
        }
        if self.answer.is_empty() {
            return Err(QuizDraftError::EmptyAnswer);
        }
        Ok(())
    }
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn module_id(&self) -> i64 {
        self.module_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options.0
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreate, QuizUpdate, i64> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            r#"
            INSERT INTO quizzes (module_id, question, options, answer)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(data.module_id)
        .bind(&data.question)
        .bind(Json(&data.options))
        .bind(&data.answer)
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizUpdate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            r#"
            UPDATE quizzes SET
                question = COALESCE($1, question),
                options = COALESCE($2, options),
                answer = COALESCE($3, answer)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.question)
        .bind(data.options.map(Json))
        .bind(data.answer)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

// Utils

impl Quiz {
    pub async fn find_all_by_module(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        module_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT *
            FROM quizzes q
            WHERE q.module_id = $1
            ORDER BY q.id
            "#,
        )
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    /// Inserts the whole batch or nothing.
    pub async fn create_batch(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        batch: Vec<QuizCreate>,
    ) -> DatabaseResult<Vec<Self>> {
        let mut tx = mm.executor().begin().await?;
        let mut created = Vec::with_capacity(batch.len());

        for data in batch {
            let quiz: Self = sqlx::query_as(
                r#"
                INSERT INTO quizzes (module_id, question, options, answer)
                VALUES ($1,$2,$3,$4)
                RETURNING *
                "#,
            )
            .bind(data.module_id)
            .bind(&data.question)
            .bind(Json(&data.options))
            .bind(&data.answer)
            .fetch_one(&mut *tx)
            .await?;
            created.push(quiz);
        }

        tx.commit().await?;
        Ok(created)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn draft(question: &str, options: &[&str], answer: &str) -> QuizCreate {
        QuizCreate {
            module_id: 1,
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn valid_draft_test() {
        let quiz = draft("2 + 2?", &["1", "2", "3", "4"], "4");
        assert_eq!(quiz.validate(), Ok(()));
    }

    #[test]
    fn invalid_drafts_test() {
        assert_eq!(
            draft(" ", &["1", "2", "3", "4"], "4").validate(),
            Err(QuizDraftError::EmptyQuestion)
        );
        assert_eq!(
            draft("q", &["1", "2", "3"], "1").validate(),
            Err(QuizDraftError::OptionCount(3))
        );
        assert_eq!(
            draft("q", &["1", "2", "3", "4", "5"], "1").validate(),
            Err(QuizDraftError::OptionCount(5))
        );
        assert_eq!(
            draft("q", &["1", "2", "3", "4"], "").validate(),
            Err(QuizDraftError::EmptyAnswer)
        );
    }
}
