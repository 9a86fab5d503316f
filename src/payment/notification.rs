use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    model::{
        ModelManager,
        entity::{Order, OrderTransition, order::is_success_status},
    },
    payment::{
        PaymentError, PaymentResult,
        signature::{parse_order_ref, verify_signature},
    },
    web::AuthenticatedUser,
};

/// Webhook body as posted by the gateway. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct PaymentNotification {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
    pub gross_amount: Option<String>,
    pub signature_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedNotification {
    pub order_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    Applied {
        order_id: i64,
        status: String,
        enrolled: bool,
    },
    AlreadyProcessed {
        order_id: i64,
        status: String,
    },
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> PaymentResult<&'a str> {
    field
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(PaymentError::Malformed(name))
}

impl PaymentNotification {
    /// Checks the field set and the signature, then resolves the order id.
    pub fn verify(&self, server_key: &str) -> PaymentResult<VerifiedNotification> {
        let order_ref = required(&self.order_id, "order_id")?;
        let status = required(&self.transaction_status, "transaction_status")?;
        let gross_amount = required(&self.gross_amount, "gross_amount")?;
        let signature = required(&self.signature_key, "signature_key")?;

        if !verify_signature(order_ref, gross_amount, server_key, signature) {
            warn!(order_ref, "payment notification with bad signature");
            return Err(PaymentError::SignatureMismatch);
        }

        let order_id = parse_order_ref(order_ref)
            .ok_or_else(|| PaymentError::InvalidOrderReference(order_ref.to_string()))?;

        Ok(VerifiedNotification {
            order_id,
            status: status.to_string(),
        })
    }
}

/// Verifies `notification` and moves the order out of `pending`. A
/// redelivered notification for a settled order changes nothing.
pub async fn handle_notification(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    server_key: &str,
    notification: &PaymentNotification,
) -> PaymentResult<NotificationOutcome> {
    let verified = notification.verify(server_key)?;

    let transition =
        Order::transition_from_pending(mm, actor, verified.order_id, &verified.status)
            .await?
            .ok_or(PaymentError::OrderNotFound(verified.order_id))?;

    let outcome = match transition {
        OrderTransition::Applied { order, enrollment } => {
            info!(
                order_id = order.id(),
                status = order.status(),
                "order left pending"
            );
            if let Some(enrollment) = &enrollment {
                info!(
                    user_id = enrollment.user_id(),
                    course_id = enrollment.course_id(),
                    "enrollment created from payment"
                );
            } else if is_success_status(order.status()) {
                info!(order_id = order.id(), "buyer was already enrolled");
            }
            NotificationOutcome::Applied {
                order_id: order.id(),
                status: order.status().to_string(),
                enrolled: enrollment.is_some(),
            }
        }
        OrderTransition::AlreadyProcessed { order } => {
            info!(
                order_id = order.id(),
                status = order.status(),
                "order already processed"
            );
            NotificationOutcome::AlreadyProcessed {
                order_id: order.id(),
                status: order.status().to_string(),
            }
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::payment::signature::expected_signature;

    const KEY: &str = "server-key";

    fn signed(order_ref: &str, status: &str, amount: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: Some(order_ref.to_string()),
            transaction_status: Some(status.to_string()),
            gross_amount: Some(amount.to_string()),
            signature_key: Some(expected_signature(order_ref, amount, KEY)),
        }
    }

    #[test]
    fn verify_test() {
        let verified = signed("ORDER-12", "settlement", "100000.00")
            .verify(KEY)
            .unwrap();
        assert_eq!(
            verified,
            VerifiedNotification {
                order_id: 12,
                status: "settlement".to_string()
            }
        );
    }

    #[test]
    fn missing_field_test() {
        let mut n = signed("ORDER-12", "settlement", "100000.00");
        n.gross_amount = None;
        assert!(matches!(
            n.verify(KEY),
            Err(PaymentError::Malformed("gross_amount"))
        ));

        let mut n = signed("ORDER-12", "settlement", "100000.00");
        n.signature_key = Some(String::new());
        assert!(matches!(
            n.verify(KEY),
            Err(PaymentError::Malformed("signature_key"))
        ));
    }

    #[test]
    fn tampered_test() {
        let mut n = signed("ORDER-12", "settlement", "100000.00");
        n.gross_amount = Some("1.00".to_string());
        assert!(matches!(n.verify(KEY), Err(PaymentError::SignatureMismatch)));

        let n = signed("ORDER-12", "settlement", "100000.00");
        assert!(matches!(
            n.verify("another-key"),
            Err(PaymentError::SignatureMismatch)
        ));
    }

    #[test]
    fn bad_reference_test() {
        let n = signed("INV-12", "settlement", "100000.00");
        assert!(matches!(
            n.verify(KEY),
            Err(PaymentError::InvalidOrderReference(_))
        ));
    }

    #[test]
    fn deserialize_test() {
        let n: PaymentNotification = serde_json::from_str(
            r#"{"order_id":"ORDER-1","transaction_status":"capture","gross_amount":"5.00","signature_key":"x","fraud_status":"accept"}"#,
        )
        .unwrap();
        assert_eq!(n.transaction_status.as_deref(), Some("capture"));

        let n: PaymentNotification = serde_json::from_str("{}").unwrap();
        assert!(n.order_id.is_none());
    }
}
