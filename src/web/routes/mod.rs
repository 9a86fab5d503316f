use crate::{
    model::{
        CrudRepository, DatabaseError, ResourceTyped, can_access_course, check_access,
        entity::{Course, Module},
    },
    web::{AppState, AuthenticatedUser, WebError, WebResult, doc::ApiDoc},
};
use axum::Router;
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod account;
pub mod admin;
pub mod courses;
pub mod feedback;
pub mod instructor;
pub mod learner;
pub mod payments;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

pub fn build_app(state: AppState) -> Router {
    let docs = state.config().app().docs();
    let me = account::me_routes(state.clone()).merge(learner::routes(state.clone()));
    let root = payments::routes(state.clone()).merge(feedback::routes(state.clone()));

    let mut router = Router::new()
        .nest("/api/v1/auth", account::auth_routes(state.clone()))
        .nest("/api/v1/me", me)
        .nest("/api/v1/courses", courses::routes(state.clone()))
        .nest("/api/v1/instructor", instructor::routes(state.clone()))
        .nest("/api/v1/admin", admin::routes(state.clone()))
        .nest("/api/v1", root)
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive());

    if docs {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

// Shared lookups

pub(crate) async fn fetch_course(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: i64,
) -> WebResult<Course> {
    Course::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))
}

pub(crate) async fn fetch_module_in_course(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: i64,
    module_id: i64,
) -> WebResult<Module> {
    Module::find_in_course(state.pool(), user, course_id, module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Module::get_resource_type()))
}

/// Enrollment gate: owner, admin or enrolled user.
pub(crate) async fn ensure_course_access(
    state: &AppState,
    user: &AuthenticatedUser,
    course: &Course,
) -> WebResult<()> {
    let allowed = can_access_course(state.pool(), user, course)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    if allowed {
        Ok(())
    } else {
        Err(WebError::resource_not_enrolled(Course::get_resource_type()))
    }
}

pub(crate) async fn ensure_course_owner(
    state: &AppState,
    user: &AuthenticatedUser,
    course: &Course,
) -> WebResult<()> {
    check_access(state.pool(), user, course, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Course::get_resource_type())
            } else {
                WebError::resource_fetch_error(Course::get_resource_type(), e)
            }
        })
}
