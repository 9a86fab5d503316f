use thiserror::Error;

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("notification is missing field `{0}`")]
    Malformed(&'static str),
    #[error("notification signature mismatch")]
    SignatureMismatch,
    #[error("invalid order reference: {0}")]
    InvalidOrderReference(String),
    #[error("order {0} not found")]
    OrderNotFound(i64),
    #[error("gateway request failed: {0}")]
    Gateway(#[from] reqwest::Error),
    #[error("gateway rejected transaction: {0}")]
    GatewayRejected(String),
    #[error("database error: {0}")]
    Database(#[from] crate::model::DatabaseError),
}
