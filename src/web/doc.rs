use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

pub struct AuthSchemesModifier;

impl Modify for AuthSchemesModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::register_handler,
        crate::web::routes::account::login_handler,
        crate::web::routes::account::profile_handler,
        crate::web::routes::account::profile_update_handler,
        crate::web::routes::account::password_change_handler,
        crate::web::routes::account::account_delete_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::course_outline_handler,
        crate::web::routes::courses::course_modules_handler,
        crate::web::routes::courses::module_detail_handler,
        crate::web::routes::courses::module_quizzes_handler,
        crate::web::routes::courses::module_submit_handler,
        crate::web::routes::instructor::instructor_courses_handler,
        crate::web::routes::instructor::course_create_handler,
        crate::web::routes::instructor::course_update_handler,
        crate::web::routes::instructor::course_delete_handler,
        crate::web::routes::instructor::module_create_handler,
        crate::web::routes::instructor::module_update_handler,
        crate::web::routes::instructor::module_delete_handler,
        crate::web::routes::instructor::quizzes_create_handler,
        crate::web::routes::instructor::quizzes_list_handler,
        crate::web::routes::instructor::quiz_update_handler,
        crate::web::routes::instructor::quiz_delete_handler,
        crate::web::routes::instructor::earnings_handler,
        crate::web::routes::learner::my_courses_handler,
        crate::web::routes::learner::course_status_handler,
        crate::web::routes::learner::quiz_results_handler,
        crate::web::routes::payments::checkout_handler,
        crate::web::routes::payments::notification_handler,
        crate::web::routes::feedback::feedback_create_handler,
        crate::web::routes::admin::course_publish_handler,
        crate::web::routes::admin::course_unpublish_handler,
        crate::web::routes::admin::feedback_search_handler,
        crate::web::routes::admin::course_feedback_handler,
        crate::web::routes::admin::overview_handler,
        crate::web::routes::admin::transactions_handler,
        crate::web::routes::admin::user_list_handler,
        crate::web::routes::admin::user_get_handler,
        crate::web::routes::admin::user_update_handler,
        crate::web::routes::admin::user_delete_handler,
    ),
    modifiers(&AuthSchemesModifier),
    tags(
        (name = "account", description = "Registration, login and profile"),
        (name = "courses", description = "Catalog and gated course content"),
        (name = "instructor", description = "Course authoring"),
        (name = "learner", description = "Progress of the signed in user"),
        (name = "payments", description = "Checkout and gateway webhook"),
        (name = "feedback", description = "Course ratings"),
        (name = "admin", description = "Moderation and reporting"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_paths_test() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/courses/{course_id}/modules/{module_id}/submit"));
        assert!(paths.contains_key("/api/v1/payment/notification"));
        assert!(paths.contains_key("/api/v1/me/courses/{course_id}/status"));

        let components = doc.components.expect("components are generated");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.security_schemes.contains_key("cookie"));
    }
}
