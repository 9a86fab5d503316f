use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::post,
};

use crate::{
    model::{
        ResourceTyped,
        entity::{
            Feedback, FeedbackCreate,
            feedback::{MAX_RATING, MIN_RATING},
        },
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::feedback::FeedbackCreateRequest,
        error::ErrorResponse, middlewares, routes::fetch_course,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/feedback", post(feedback_create_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = FeedbackCreateRequest,
    description = "Rates a course",
    responses(
        (status = 201, description = "Feedback stored", body = Feedback),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "feedback",
    security(("bearer" = []), ("cookie" = []))
)]
async fn feedback_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<FeedbackCreateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    if !(MIN_RATING..=MAX_RATING).contains(&payload.rating) {
        return Err(WebError::resource_bad_request(
            Feedback::get_resource_type(),
            format!("rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }

    let course = fetch_course(&state, user, payload.course_id).await?;

    let data = FeedbackCreate {
        user_id: user.user_id(),
        course_id: course.id(),
        rating: payload.rating,
        comment: payload.comment,
    };

    let feedback = Feedback::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Feedback::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(feedback)))
}
