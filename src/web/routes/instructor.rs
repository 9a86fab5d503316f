use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            Course, CourseCreate, CourseEarningsRow, Module, ModuleCreate, Quiz, QuizCreate,
            QuizUpdate,
        },
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            instructor::{
                CourseCreateRequest, CourseUpdateRequest, ModuleCreateRequest,
                ModuleUpdateRequest, QuizCreateRequest,
            },
        },
        error::ErrorResponse,
        middlewares,
        routes::{ensure_course_owner, fetch_course, fetch_module_in_course},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/courses",
            get(instructor_courses_handler).post(course_create_handler),
        )
        .route(
            "/courses/{course_id}",
            put(course_update_handler).delete(course_delete_handler),
        )
        .route("/courses/{course_id}/modules", post(module_create_handler))
        .route(
            "/courses/{course_id}/modules/{module_id}",
            put(module_update_handler).delete(module_delete_handler),
        )
        .route(
            "/courses/{course_id}/modules/{module_id}/quizzes",
            post(quizzes_create_handler).get(quizzes_list_handler),
        )
        .route(
            "/courses/{course_id}/modules/{module_id}/quizzes/{quiz_id}",
            put(quiz_update_handler).delete(quiz_delete_handler),
        )
        .route("/earnings", get(earnings_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/instructor/courses",
    description = "Courses authored by the signed in instructor, published or not",
    responses(
        (status = 200, description = "Own courses", body = Vec<Course>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn instructor_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let courses = Course::list_by_instructor(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/instructor/courses",
    request_body = CourseCreateRequest,
    description = "Creates an unpublished course owned by the caller",
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;

    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "title is required",
        ));
    }
    let price = payload.price.unwrap_or(0);
    if price < 0 {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "price must not be negative",
        ));
    }

    let data = CourseCreate {
        title: payload.title,
        description: payload.description,
        price,
        instructor_id: user.user_id(),
    };

    let course = Course::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/instructor/courses/{course_id}",
    request_body = CourseUpdateRequest,
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid course data", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CourseUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;

    if payload.price.is_some_and(|p| p < 0) {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "price must not be negative",
        ));
    }

    let updated = course
        .update(state.pool(), user, payload.into())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/instructor/courses/{course_id}",
    description = "Deletes a course with its modules, quizzes and results",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;

    course
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("course deleted"))))
}

#[utoipa::path(
    post,
    path = "/api/v1/instructor/courses/{course_id}/modules",
    request_body = ModuleCreateRequest,
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 400, description = "Invalid module data", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Json(payload): Json<ModuleCreateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;

    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            Module::get_resource_type(),
            "title is required",
        ));
    }

    let data = ModuleCreate {
        course_id: course.id(),
        title: payload.title,
        content: payload.content.unwrap_or_default(),
        pdf_url: payload.pdf_url,
        order_index: payload.order,
    };

    let module = Module::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}",
    request_body = ModuleUpdateRequest,
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
    Json(payload): Json<ModuleUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    let updated = module
        .update(state.pool(), user, payload.into())
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    module
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("module deleted"))))
}

#[utoipa::path(
    post,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}/quizzes",
    description = "Adds a batch of quizzes. Nothing is stored if any item is invalid",
    request_body = Vec<QuizCreateRequest>,
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 201, description = "Quizzes created", body = Vec<Quiz>),
        (status = 400, description = "Invalid quiz in batch", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quizzes_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
    Json(payload): Json<Vec<QuizCreateRequest>>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    if payload.is_empty() {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            "empty quiz batch",
        ));
    }

    let drafts: Vec<QuizCreate> = payload
        .into_iter()
        .map(|q| q.into_draft(module.id()))
        .collect();

    for (idx, draft) in drafts.iter().enumerate() {
        draft.validate().map_err(|e| {
            WebError::resource_bad_request(Quiz::get_resource_type(), format!("quiz #{idx}: {e}"))
        })?;
    }

    let created = Quiz::create_batch(state.pool(), user, drafts)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}/quizzes",
    description = "Quizzes of an owned module, answers included",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Quizzes", body = Vec<Quiz>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quizzes_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_owner(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    let quizzes = Quiz::find_all_by_module(state.pool(), user, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(quizzes)))
}

async fn fetch_quiz_in_module(
    state: &AppState,
    ctx: &RequestContext,
    course_id: i64,
    module_id: i64,
    quiz_id: i64,
) -> WebResult<Quiz> {
    let user = ctx.instructor()?;
    let course = fetch_course(state, user, course_id).await?;
    ensure_course_owner(state, user, &course).await?;
    let module = fetch_module_in_course(state, user, course_id, module_id).await?;

    Quiz::find_by_id(state.pool(), user, quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .filter(|quiz| quiz.module_id() == module.id())
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))
}

#[utoipa::path(
    put,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}/quizzes/{quiz_id}",
    request_body = QuizCreateRequest,
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
        ("quiz_id" = i64, Path, description = "Quiz id"),
    ),
    responses(
        (status = 200, description = "Quiz replaced", body = Quiz),
        (status = 400, description = "Invalid quiz", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course, module or quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id, quiz_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<QuizCreateRequest>,
) -> WebResult<impl IntoResponse> {
    let quiz = fetch_quiz_in_module(&state, &ctx, course_id, module_id, quiz_id).await?;
    let user = ctx.instructor()?;

    let draft = payload.into_draft(module_id);
    draft
        .validate()
        .map_err(|e| WebError::resource_bad_request(Quiz::get_resource_type(), e.to_string()))?;

    let data = QuizUpdate {
        question: Some(draft.question),
        options: Some(draft.options),
        answer: Some(draft.answer),
    };

    let updated = quiz
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/instructor/courses/{course_id}/modules/{module_id}/quizzes/{quiz_id}",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
        ("quiz_id" = i64, Path, description = "Quiz id"),
    ),
    responses(
        (status = 200, description = "Quiz deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Not your course", body = ErrorResponse),
        (status = 404, description = "Course, module or quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn quiz_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id, quiz_id)): Path<(i64, i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let quiz = fetch_quiz_in_module(&state, &ctx, course_id, module_id, quiz_id).await?;
    let user = ctx.instructor()?;

    quiz.delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("quiz deleted"))))
}

#[utoipa::path(
    get,
    path = "/api/v1/instructor/earnings",
    description = "Enrollment count and paid revenue per owned course",
    responses(
        (status = 200, description = "Earnings", body = Vec<CourseEarningsRow>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "instructor",
    security(("bearer" = []), ("cookie" = []))
)]
async fn earnings_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.instructor()?;
    let rows = CourseEarningsRow::fetch_for_instructor(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}
