use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct FeedbackCreateRequest {
    pub course_id: i64,
    /// 1 to 5.
    pub rating: i32,
    pub comment: String,
}
