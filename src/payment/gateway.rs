use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::payment::{PaymentError, PaymentResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// `ORDER-<id>` reference echoed back by the webhook.
    pub order_ref: String,
    pub gross_amount: i64,
    pub customer_email: String,
}

/// Hosted payment page provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers a transaction and returns the URL the buyer is redirected to.
    async fn create_transaction(&self, request: &CheckoutRequest) -> PaymentResult<String>;
}

#[derive(Serialize)]
struct SnapTransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Serialize)]
struct SnapCustomerDetails<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct SnapRequest<'a> {
    transaction_details: SnapTransactionDetails<'a>,
    customer_details: SnapCustomerDetails<'a>,
}

#[derive(Deserialize)]
struct SnapResponse {
    redirect_url: String,
}

#[derive(Deserialize, Default)]
struct SnapErrorResponse {
    #[serde(default)]
    error_messages: Vec<String>,
}

/// Snap transactions API client. Authenticates with the server key as the
/// basic auth user name.
#[derive(Debug, Clone)]
pub struct SnapGateway {
    http_client: reqwest::Client,
    server_key: String,
    snap_url: String,
}

impl SnapGateway {
    pub fn new(server_key: impl Into<String>, snap_url: impl Into<String>) -> PaymentResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http_client,
            server_key: server_key.into(),
            snap_url: snap_url.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for SnapGateway {
    async fn create_transaction(&self, request: &CheckoutRequest) -> PaymentResult<String> {
        let body = SnapRequest {
            transaction_details: SnapTransactionDetails {
                order_id: &request.order_ref,
                gross_amount: request.gross_amount,
            },
            customer_details: SnapCustomerDetails {
                email: &request.customer_email,
            },
        };

        let response = self
            .http_client
            .post(&self.snap_url)
            .basic_auth(&self.server_key, Some(""))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error: SnapErrorResponse = response.json().await.unwrap_or_default();
            let reason = if error.error_messages.is_empty() {
                status.to_string()
            } else {
                error.error_messages.join("; ")
            };
            return Err(PaymentError::GatewayRejected(reason));
        }

        let snap: SnapResponse = response.json().await?;
        Ok(snap.redirect_url)
    }
}
