use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, Page, entity::Enrollment, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_FAILED: &str = "failed";

/// Gateway statuses meaning the money arrived.
pub const SUCCESS_STATUSES: [&str; 2] = ["settlement", "capture"];

pub fn is_success_status(status: &str) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Order {
    id: i64,
    user_id: i64,
    course_id: i64,
    amount: i64,
    status: String,
    snap_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct OrderCreate {
    pub user_id: i64,
    pub course_id: i64,
    pub amount: i64,
}

/// Result of applying a gateway status to an order.
#[derive(Debug)]
pub enum OrderTransition {
    /// The order left `pending`. `enrollment` is set when the new status is a
    /// success status and the user was not enrolled yet.
    Applied {
        order: Order,
        enrollment: Option<Enrollment>,
    },
    /// The order had already left `pending`, nothing was written.
    AlreadyProcessed { order: Order },
}

impl ResourceTyped for Order {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Order
    }
}

impl Order {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn snap_url(&self) -> Option<&str> {
        self.snap_url.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

impl Order {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: OrderCreate,
    ) -> DatabaseResult<Self> {
        let order = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id, course_id, amount, status)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(data.amount)
        .bind(STATUS_PENDING)
        .fetch_one(mm.executor())
        .await?;

        Ok(order)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn set_snap_url(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        snap_url: String,
    ) -> DatabaseResult<Self> {
        let order = sqlx::query_as(
            "UPDATE orders SET snap_url = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(snap_url)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(order)
    }

    /// Applies `status` only while the order is still `pending`. The status
    /// change and the enrollment insert share one transaction, so a success
    /// status enrolls the buyer at most once per order.
    pub async fn transition_from_pending(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
        status: &str,
    ) -> DatabaseResult<Option<OrderTransition>> {
        let mut tx = mm.executor().begin().await?;

        let updated: Option<Self> = sqlx::query_as(
            r#"
            UPDATE orders SET status = $1, updated_at = now()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(STATUS_PENDING)
        .fetch_optional(&mut *tx)
        .await?;

        let transition = match updated {
            Some(order) => {
                let enrollment = if is_success_status(order.status()) {
                    Enrollment::create_if_absent(&mut *tx, order.user_id, order.course_id).await?
                } else {
                    None
                };
                Some(OrderTransition::Applied { order, enrollment })
            }
            None => {
                let current: Option<Self> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
                current.map(|order| OrderTransition::AlreadyProcessed { order })
            }
        };

        tx.commit().await?;
        Ok(transition)
    }

    pub async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<Self>> {
        let items = sqlx::query_as("SELECT * FROM orders ORDER BY id DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        let total = Self::count(mm, actor).await?;
        Ok(Page::new(items, total, limit, offset))
    }

    pub async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Order {
    type OwnerId = i64;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn success_statuses_test() {
        assert!(is_success_status("settlement"));
        assert!(is_success_status("capture"));
        assert!(!is_success_status("pending"));
        assert!(!is_success_status("deny"));
        assert!(!is_success_status("Settlement"));
    }
}
