use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};

use crate::{
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped,
        entity::{
            Course, CourseUpdate, Enrollment, Feedback, FeedbackFilter, FeedbackRow, Order,
            UserEntity,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            admin::{AdminUserUpdateRequest, Overview},
        },
        error::ErrorResponse,
        middlewares,
        routes::{PaginationQuery, fetch_course},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses/{course_id}/publish", put(course_publish_handler))
        .route(
            "/courses/{course_id}/unpublish",
            put(course_unpublish_handler),
        )
        .route(
            "/courses/{course_id}/feedback",
            get(course_feedback_handler),
        )
        .route("/feedback", get(feedback_search_handler))
        .route("/overview", get(overview_handler))
        .route("/transactions", get(transactions_handler))
        .route("/users/page", get(user_list_handler))
        .route(
            "/users/{user_id}",
            get(user_get_handler)
                .put(user_update_handler)
                .delete(user_delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn set_published(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: i64,
    published: bool,
) -> WebResult<Course> {
    let course = fetch_course(state, user, course_id).await?;
    let data = CourseUpdate {
        published: Some(published),
        ..Default::default()
    };

    let updated = course
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course_id, published, "course visibility changed");
    Ok(updated)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{course_id}/publish",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course published", body = Course),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let course = set_published(&state, user, course_id, true).await?;
    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{course_id}/unpublish",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course hidden", body = Course),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_unpublish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let course = set_published(&state, user, course_id, false).await?;
    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/feedback",
    params(FeedbackFilter),
    description = "Feedback across all courses, filtered",
    responses(
        (status = 200, description = "Matching feedback", body = Vec<FeedbackRow>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn feedback_search_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(filter): Query<FeedbackFilter>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let rows = FeedbackRow::search(state.pool(), user, &filter)
        .await
        .map_err(|e| WebError::resource_fetch_error(Feedback::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{course_id}/feedback",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Feedback of the course, newest first", body = Vec<FeedbackRow>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_feedback_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let course = fetch_course(&state, user, course_id).await?;

    let filter = FeedbackFilter {
        course_id: Some(course.id()),
        ..Default::default()
    };
    let rows = FeedbackRow::search(state.pool(), user, &filter)
        .await
        .map_err(|e| WebError::resource_fetch_error(Feedback::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/overview",
    responses(
        (status = 200, description = "Platform totals", body = Overview),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn overview_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let mm = state.pool();

    let total_users = UserEntity::count(mm, user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    let total_courses = Course::count(mm, user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    let total_enrollments = Enrollment::count(mm, user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    let total_orders = Order::count(mm, user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(Overview {
            total_users,
            total_courses,
            total_enrollments,
            total_orders,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/transactions",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = crate::model::Page<Order>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn transactions_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let orders = Order::page(state.pool(), user, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/page",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn user_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let users = UserEntity::page(state.pool(), user, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

async fn fetch_user(
    state: &AppState,
    actor: &AuthenticatedUser,
    user_id: i64,
) -> WebResult<UserEntity> {
    UserEntity::find_by_id(state.pool(), actor, user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserEntity),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn user_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let found = fetch_user(&state, user, user_id).await?;
    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{user_id}",
    request_body = AdminUserUpdateRequest,
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated successfully", body = UserEntity),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn user_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<AdminUserUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let found = fetch_user(&state, user, user_id).await?;

    if payload.username.is_some() || payload.email.is_some() {
        let conflict = UserEntity::find_conflicting(
            state.pool(),
            user,
            payload.username.as_deref(),
            payload.email.as_deref(),
            Some(found.id()),
        )
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

        if conflict.is_some() {
            return Err(WebError::registration_conflict());
        }
    }

    let updated = found
        .update(state.pool(), user, payload.into())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{user_id}",
    description = "Deletes specified user",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted successfully", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []), ("cookie" = []))
)]
async fn user_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.admin_user()?;
    let found = fetch_user(&state, user, user_id).await?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("user deleted"))))
}
