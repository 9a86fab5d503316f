use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        ResourceTyped,
        completion::{CompletionError, CourseStatus, course_status},
        entity::{Course, Module, QuizResult},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        error::ErrorResponse,
        middlewares,
        routes::{ensure_course_access, fetch_course},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses", get(my_courses_handler))
        .route("/courses/{course_id}/status", get(course_status_handler))
        .route(
            "/courses/{course_id}/quiz-results",
            get(quiz_results_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/me/courses",
    description = "Courses the signed in user is enrolled in",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<Course>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "learner",
    security(("bearer" = []), ("cookie" = []))
)]
async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let courses = Course::list_enrolled(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/courses/{course_id}/status",
    description = "Completion of a course computed from the latest attempt per module",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Completion status", body = CourseStatus),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Course not purchased", body = ErrorResponse),
        (status = 404, description = "Course not found or has no modules", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "learner",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_status_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_access(&state, user, &course).await?;

    let status = course_status(state.pool(), user, course.id(), user.user_id())
        .await
        .map_err(|e| match e {
            CompletionError::NoModules => WebError::resource_not_found(Module::get_resource_type()),
            CompletionError::Database(e) => {
                WebError::resource_fetch_error(QuizResult::get_resource_type(), e)
            }
        })?;

    Ok((StatusCode::OK, Json(status)))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/courses/{course_id}/quiz-results",
    description = "Every recorded attempt of the signed in user in a course, newest first",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Attempts", body = Vec<QuizResult>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "learner",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_results_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, course_id).await?;

    let results =
        QuizResult::find_all_by_user_and_course(state.pool(), user, user.user_id(), course.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(QuizResult::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(results)))
}
