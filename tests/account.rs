mod common;
use lernly::model::entity::UserEntity;
use lernly::web::middlewares::AUTH_TOKEN;
use reqwest::StatusCode;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, USER_PASSWORD, email_of, login_action, login_admin_action, register_action,
    setup_server, setup_test_db,
};

#[tokio::test]
async fn route_register_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("alice", "user").assert_body(|body| {
            let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
            assert_eq!(ent.username(), "alice");
            assert!(!body.contains("password"));
        }))
        .step(register_action("bob", "instructor").assert_body(|body| {
            assert!(body.contains(r#""role":"instructor""#));
        }))
        // role defaults to user
        .step(
            Action::new("register_default_role", "POST", "/api/v1/auth/register")
                .with_body(json!({
                    "full_name": "Carol",
                    "username": "carol",
                    "email": "carol@lernly.test",
                    "password": "pw",
                }))
                .with_expect(StatusCode::CREATED)
                .assert_body(|body| assert!(body.contains(r#""role":"user""#))),
        )
        // same username or email twice
        .step(register_action("alice", "user").with_expect(StatusCode::CONFLICT))
        // nobody registers as admin
        .step(register_action("mallory", "admin").with_expect(StatusCode::BAD_REQUEST))
        .step(
            Action::new("register_missing_field", "POST", "/api/v1/auth/register")
                .with_body(json!({
                    "full_name": "",
                    "username": "dave",
                    "email": "dave@lernly.test",
                    "password": "pw",
                }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_login_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("erin", "user"))
        .step(
            login_action("erin")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert!(body.contains("token"));
                    assert!(body.contains("erin"));
                })
                .with_save_as("login")
                .with_clear_cookies(true),
        )
        // cookie session
        .step(
            Action::new("profile", "GET", "/api/v1/auth/me")
                .assert_body(|body| assert!(body.contains("erin"))),
        )
        // bearer session without cookies
        .step(
            Action::new("profile_bearer", "GET", "/api/v1/auth/me")
                .with_clear_cookies(true)
                .with_dyn_bearer(|ctx| ctx.get("login")["token"].as_str().unwrap().to_string())
                .assert_body(|body| assert!(body.contains("erin"))),
        )
        .step(
            Action::new("profile_garbage_token", "GET", "/api/v1/auth/me")
                .with_dyn_bearer(|_| String::from("not-a-jwt"))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("profile_anonymous", "GET", "/api/v1/auth/me")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("login_wrong_password", "POST", "/api/v1/auth/login")
                .with_body(json!({ "email": email_of("erin"), "password": "nope" }))
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .step(
            Action::new("login_unknown", "POST", "/api/v1/auth/login")
                .with_body(json!({ "email": "ghost@lernly.test", "password": USER_PASSWORD }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_profile_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("frank", "user"))
        .step(register_action("grace", "user"))
        .step(login_action("frank"))
        .step(
            Action::new("profile_update", "PUT", "/api/v1/me/profile")
                .with_body(json!({ "full_name": "Frank Renamed" }))
                .assert_body(|body| assert!(body.contains("Frank Renamed"))),
        )
        // grace's username is taken
        .step(
            Action::new("profile_update_conflict", "PUT", "/api/v1/me/profile")
                .with_body(json!({ "username": "grace" }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("password_wrong_old", "PUT", "/api/v1/me/password")
                .with_body(json!({ "old_password": "nope", "new_password": "new-secret" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("password_change", "PUT", "/api/v1/me/password")
                .with_body(json!({ "old_password": USER_PASSWORD, "new_password": "new-secret" })),
        )
        .step(
            Action::new("login_new_password", "POST", "/api/v1/auth/login")
                .with_body(json!({ "email": email_of("frank"), "password": "new-secret" })),
        )
        .step(Action::new("account_delete", "DELETE", "/api/v1/me"))
        .step(
            Action::new("login_deleted", "POST", "/api/v1/auth/login")
                .with_body(json!({ "email": email_of("frank"), "password": "new-secret" }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_users_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(register_action("heidi", "user").with_save_as("heidi"))
        .step(login_action("heidi"))
        .step(
            Action::new("user_list_forbidden", "GET", "/api/v1/admin/users/page")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_admin_action())
        .step(
            Action::new("user_list", "GET", "/api/v1/admin/users/page")
                .with_param("limit", "2")
                .with_param("offset", "0")
                .assert_body(|body| {
                    let page: serde_json::Value = serde_json::from_str(body).unwrap();
                    assert_eq!(page["total"], 3);
                    assert_eq!(page["items"].as_array().unwrap().len(), 2);
                }),
        )
        .step(
            Action::new("user_promote", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.get_i64("heidi", "id")))
                .with_body(json!({ "role": "instructor" }))
                .assert_body(|body| assert!(body.contains(r#""role":"instructor""#))),
        )
        .step(
            Action::new("user_delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.get_i64("heidi", "id"))),
        )
        .step(
            Action::new("user_get_deleted", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.get_i64("heidi", "id")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
