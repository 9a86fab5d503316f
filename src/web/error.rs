use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
    payment::PaymentError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,

    #[error("RegistrationRoleForbidden: {role}")]
    RegistrationRoleForbidden { role: String },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid { error: jsonwebtoken::errors::Error },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationRoleRequired")]
    AuthenticationRoleRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceNotEnrolled: {resource_type:?}")]
    ResourceNotEnrolled { resource_type: ResourceType },

    #[error("ResourceConflict: {resource_type:?}. {details}")]
    ResourceConflict {
        resource_type: ResourceType,
        details: String,
    },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}. {details}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        details: String,
    },
}

#[derive(Debug, Error)]
pub enum PaymentNotificationError {
    #[error("NotificationMalformed: {0}")]
    NotificationMalformed(String),

    #[error("SignatureInvalid")]
    SignatureInvalid,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),

    #[error("ServerGatewayError: {0}")]
    ServerGatewayError(PaymentError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerCryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerGatewayError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerCryptError(_) => String::from("Internal server error."),
            Self::ServerGatewayError(_) => String::from("Payment gateway unavailable."),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
            Self::RegistrationRoleForbidden { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
            Self::RegistrationRoleForbidden { role } => {
                format!("Registration error, role `{role}` is not allowed.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenInvalid { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationRoleRequired => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationTokenInvalid { .. } => {
                String::from("Authentication error, token invalid or expired.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationRoleRequired => {
                String::from("Authentication error, insufficient role.")
            }
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceNotEnrolled { .. } => StatusCode::FORBIDDEN,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceNotEnrolled { .. } => {
                String::from("Resource error, you must purchase this course first.")
            }
            Self::ResourceConflict { details, .. } => format!("Resource error, {details}."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { details, .. } => {
                format!("Resource error, bad request: {details}.")
            }
        }
    }
}

impl PaymentNotificationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotificationMalformed(_) => StatusCode::BAD_REQUEST,
            Self::SignatureInvalid => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::NotificationMalformed(reason) => {
                format!("Payment notification error, malformed payload: {reason}.")
            }
            Self::SignatureInvalid => String::from("Payment notification error, invalid signature."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("PaymentNotificationError - {0}")]
    PaymentNotificationError(#[from] PaymentNotificationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_not_enrolled(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotEnrolled {
            resource_type: r#type,
        })
    }

    pub fn resource_conflict<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            details: details.into(),
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            details: details.into(),
        })
    }

    pub fn auth_token_invalid(error: jsonwebtoken::errors::Error) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid { error })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn role_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRoleRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn registration_role_forbidden<S: Into<String>>(role: S) -> Self {
        Self::RegistrationError(RegistrationError::RegistrationRoleForbidden { role: role.into() })
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::PaymentNotificationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::PaymentNotificationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

impl From<PaymentError> for WebError {
    fn from(error: PaymentError) -> Self {
        match error {
            PaymentError::Malformed(_) | PaymentError::InvalidOrderReference(_) => {
                PaymentNotificationError::NotificationMalformed(error.to_string()).into()
            }
            PaymentError::SignatureMismatch => PaymentNotificationError::SignatureInvalid.into(),
            PaymentError::OrderNotFound(_) => Self::resource_not_found(ResourceType::Order),
            PaymentError::Database(e) => Self::resource_fetch_error(ResourceType::Order, e),
            PaymentError::Gateway(_) | PaymentError::GatewayRejected(_) => {
                Self::ServerError(ServerError::ServerGatewayError(error))
            }
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payment_error_mapping_test() {
        let err: WebError = PaymentError::SignatureMismatch.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err: WebError = PaymentError::Malformed("order_id").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: WebError = PaymentError::InvalidOrderReference("x".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: WebError = PaymentError::OrderNotFound(9).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: WebError = PaymentError::GatewayRejected("down".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn not_enrolled_is_distinct_test() {
        let gate = WebError::resource_not_enrolled(ResourceType::Course);
        assert_eq!(gate.status_code(), StatusCode::FORBIDDEN);
        assert_ne!(
            gate.client_display(),
            WebError::resource_forbidden(ResourceType::Course).client_display()
        );
        assert_ne!(
            gate.status_code(),
            WebError::resource_not_found(ResourceType::Course).status_code()
        );
        assert_ne!(gate.status_code(), WebError::auth_required().status_code());
    }
}
