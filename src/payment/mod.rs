//! Checkout against the Snap payment gateway and its status webhook.

mod error;
pub use error::{PaymentError, PaymentResult};

mod gateway;
pub use gateway::{CheckoutRequest, PaymentGateway, SnapGateway};

mod notification;
pub use notification::{
    NotificationOutcome, PaymentNotification, VerifiedNotification, handle_notification,
};

pub mod signature;
