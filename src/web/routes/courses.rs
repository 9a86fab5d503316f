use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, Module, Quiz, QuizResult},
        grading::{GradingError, SubmittedAnswer, submit_quiz},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::courses::{CourseOutline, ModuleDetail, QuizView, SubmitResponse},
        error::ErrorResponse,
        middlewares,
        routes::{ensure_course_access, fetch_course, fetch_module_in_course},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler))
        .route("/{course_id}", get(course_outline_handler))
        .route("/{course_id}/modules", get(course_modules_handler))
        .route("/{course_id}/modules/{module_id}", get(module_detail_handler))
        .route(
            "/{course_id}/modules/{module_id}/quizzes",
            get(module_quizzes_handler),
        )
        .route(
            "/{course_id}/modules/{module_id}/submit",
            post(module_submit_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "Lists published courses",
    responses(
        (status = 200, description = "Published courses", body = Vec<Course>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let anonymous = AuthenticatedUser::admin();
    let courses = Course::list_published(state.pool(), &anonymous)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    description = "Course with its module outline. Unpublished courses are visible to their instructor and admins only",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course outline", body = CourseOutline),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn course_outline_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let reader = AuthenticatedUser::admin();
    let course = fetch_course(&state, &reader, course_id).await?;

    if !course.published() {
        let visible = ctx
            .maybe_user()
            .is_some_and(|u| u.is_admin() || u.user_id() == course.instructor_id());
        if !visible {
            return Err(WebError::resource_not_found(Course::get_resource_type()));
        }
    }

    let modules = Module::find_all_by_course(state.pool(), &reader, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseOutline::from_entities(course, &modules)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/modules",
    description = "Modules of a purchased course, ordered",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules with content", body = Vec<Module>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course not purchased", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn course_modules_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_access(&state, user, &course).await?;

    let modules = Module::find_all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(modules)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/modules/{module_id}",
    description = "Module content with its quizzes, answers hidden",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module", body = ModuleDetail),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course not purchased", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_access(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    let quizzes = Quiz::find_all_by_module(state.pool(), user, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ModuleDetail::from_entities(module, &quizzes)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/modules/{module_id}/quizzes",
    description = "Quizzes of a module, answers hidden",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Quizzes", body = Vec<QuizView>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course not purchased", body = ErrorResponse),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_quizzes_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_access(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    let quizzes = Quiz::find_all_by_module(state.pool(), user, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;
    let views: Vec<QuizView> = quizzes.iter().map(QuizView::from).collect();

    Ok((StatusCode::OK, Json(views)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/modules/{module_id}/submit",
    description = "Grades answers for every quiz of the module and records the attempt",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("module_id" = i64, Path, description = "Module id"),
    ),
    request_body = Vec<SubmittedAnswer>,
    responses(
        (status = 201, description = "Attempt graded and recorded", body = SubmitResponse),
        (status = 400, description = "No answers submitted", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Course not purchased", body = ErrorResponse),
        (status = 404, description = "Course or module not found, or the module has no quizzes", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []), ("cookie" = []))
)]
async fn module_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i64, i64)>,
    Json(answers): Json<Vec<SubmittedAnswer>>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    if answers.is_empty() {
        return Err(WebError::resource_bad_request(
            QuizResult::get_resource_type(),
            GradingError::NoAnswers.to_string(),
        ));
    }

    let course = fetch_course(&state, user, course_id).await?;
    ensure_course_access(&state, user, &course).await?;
    let module = fetch_module_in_course(&state, user, course_id, module_id).await?;

    let submission = submit_quiz(state.pool(), user, module.id(), &answers)
        .await
        .map_err(|e| match e {
            GradingError::NoAnswers => {
                WebError::resource_bad_request(QuizResult::get_resource_type(), e.to_string())
            }
            GradingError::NoQuizzes => WebError::resource_not_found(Quiz::get_resource_type()),
            GradingError::Database(e) => {
                WebError::resource_fetch_error(QuizResult::get_resource_type(), e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse::new(
            submission.outcome,
            course_id,
            module_id,
        )),
    ))
}
