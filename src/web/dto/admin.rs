use serde::{Deserialize, Serialize};

use crate::{model::entity::UserEntityUpdate, web::UserRole};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct Overview {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_orders: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AdminUserUpdateRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl From<AdminUserUpdateRequest> for UserEntityUpdate {
    fn from(value: AdminUserUpdateRequest) -> Self {
        Self {
            full_name: value.full_name,
            username: value.username,
            email: value.email,
            role: value.role,
            password_hash: None,
        }
    }
}
