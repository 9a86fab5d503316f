use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckoutBody {
    pub course_id: i64,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_id: i64,
    pub snap_url: String,
    pub amount: i64,
    pub course_id: i64,
}
