use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};
use tracing::{info, warn};

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, Enrollment, Order, OrderCreate, order::STATUS_FAILED},
    },
    payment::{
        CheckoutRequest, NotificationOutcome, PaymentNotification, handle_notification,
        signature::format_order_ref,
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            payments::{CheckoutBody, CheckoutResponse},
        },
        error::{ErrorResponse, PaymentNotificationError},
        middlewares,
        routes::fetch_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/checkout", post(checkout_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/payment/notification", post(notification_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutBody,
    description = "Creates a pending order for a published course and returns the payment page URL",
    responses(
        (status = 200, description = "Checkout created", body = CheckoutResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled or own course", body = ErrorResponse),
        (status = 502, description = "Payment gateway failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "payments",
    security(("bearer" = []), ("cookie" = []))
)]
async fn checkout_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, payload.course_id).await?;

    if !course.published() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }
    if course.instructor_id() == user.user_id() {
        return Err(WebError::resource_conflict(
            Course::get_resource_type(),
            "you own this course",
        ));
    }

    let enrolled = Enrollment::exists(state.pool(), user, user.user_id(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if enrolled {
        return Err(WebError::resource_conflict(
            Enrollment::get_resource_type(),
            "already enrolled",
        ));
    }

    let payment = state.config().payment();
    let amount = if course.price() == 0 {
        payment.default_price()
    } else {
        course.price()
    };

    let order = Order::create(
        state.pool(),
        user,
        OrderCreate {
            user_id: user.user_id(),
            course_id: course.id(),
            amount,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let request = CheckoutRequest {
        order_ref: format_order_ref(order.id()),
        gross_amount: amount,
        customer_email: format!("user{}@{}", user.user_id(), payment.email_domain()),
    };

    let snap_url = match state.gateway().create_transaction(&request).await {
        Ok(url) => url,
        Err(e) => {
            warn!(order_id = order.id(), error = %e, "gateway refused checkout");
            Order::transition_from_pending(state.pool(), user, order.id(), STATUS_FAILED)
                .await
                .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;
            return Err(e.into());
        }
    };

    let order = order
        .set_snap_url(state.pool(), user, snap_url)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    info!(order_id = order.id(), course_id = course.id(), amount, "checkout created");

    Ok((
        StatusCode::OK,
        Json(CheckoutResponse {
            message: String::from("checkout created"),
            order_id: order.id(),
            snap_url: order.snap_url().unwrap_or_default().to_string(),
            amount: order.amount(),
            course_id: order.course_id(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/notification",
    request_body = PaymentNotification,
    description = "Gateway webhook. Authenticated by `signature_key` only. Redeliveries are acknowledged without changes",
    responses(
        (status = 200, description = "Notification acknowledged", body = MessageResponse),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 403, description = "Invalid signature", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "payments"
)]
async fn notification_handler(
    State(state): State<AppState>,
    payload: Result<Json<PaymentNotification>, JsonRejection>,
) -> WebResult<impl IntoResponse> {
    let Json(notification) = payload
        .map_err(|e| PaymentNotificationError::NotificationMalformed(e.body_text()))?;

    let system = AuthenticatedUser::admin();
    let outcome = handle_notification(
        state.pool(),
        &system,
        state.config().payment().server_key(),
        &notification,
    )
    .await?;

    let message = match outcome {
        NotificationOutcome::Applied { .. } => "payment notification processed",
        NotificationOutcome::AlreadyProcessed { .. } => "payment notification already processed",
    };

    Ok((StatusCode::OK, Json(MessageResponse::new(message))))
}
