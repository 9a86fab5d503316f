use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder, prelude::FromRow};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Feedback {
    id: i64,
    user_id: i64,
    course_id: i64,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FeedbackCreate {
    pub user_id: i64,
    pub course_id: i64,
    pub rating: i32,
    pub comment: String,
}

impl ResourceTyped for Feedback {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Feedback
    }
}

impl Feedback {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: FeedbackCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO feedback (user_id, course_id, rating, comment)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(data.rating)
        .bind(&data.comment)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Admin-side feedback query. Every `Some` field narrows the result.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedbackFilter {
    pub course_id: Option<i64>,
    pub instructor_id: Option<i64>,
    pub user_id: Option<i64>,
    pub rating: Option<i32>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Feedback joined with the names a moderator wants to see.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct FeedbackRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub course_id: i64,
    pub course_title: String,
    pub instructor_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRow {
    fn base_query<'a>() -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new(
            r#"
            SELECT
                f.id,
                f.user_id,
                u.full_name AS user_name,
                f.course_id,
                c.title AS course_title,
                i.full_name AS instructor_name,
                f.rating,
                f.comment,
                f.created_at
            FROM feedback f
            JOIN users u ON u.id = f.user_id
            JOIN courses c ON c.id = f.course_id
            JOIN users i ON i.id = c.instructor_id
            WHERE TRUE
            "#,
        )
    }

    pub async fn search(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        filter: &FeedbackFilter,
    ) -> DatabaseResult<Vec<Self>> {
        let mut query = Self::base_query();

        if let Some(course_id) = filter.course_id {
            query.push(" AND f.course_id = ").push_bind(course_id);
        }
        if let Some(instructor_id) = filter.instructor_id {
            query.push(" AND c.instructor_id = ").push_bind(instructor_id);
        }
        if let Some(user_id) = filter.user_id {
            query.push(" AND f.user_id = ").push_bind(user_id);
        }
        if let Some(rating) = filter.rating {
            query.push(" AND f.rating = ").push_bind(rating);
        }
        if let Some(min) = filter.min_rating {
            query.push(" AND f.rating >= ").push_bind(min);
        }
        if let Some(max) = filter.max_rating {
            query.push(" AND f.rating <= ").push_bind(max);
        }

        query.push(match filter.sort {
            SortOrder::Asc => " ORDER BY f.created_at ASC, f.id ASC",
            SortOrder::Desc => " ORDER BY f.created_at DESC, f.id DESC",
        });

        let rows = query
            .build_query_as::<Self>()
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}
