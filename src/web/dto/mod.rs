pub mod account;
pub mod admin;
pub mod courses;
pub mod feedback;
pub mod instructor;
pub mod payments;

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
