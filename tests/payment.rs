mod common;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    Action, COURSE_PRICE, Flow, StubGateway, checkout_action, login_action, login_admin_action,
    login_instructor_action, register_action, seed_course, settle_action, setup_server,
    setup_server_with_gateway, setup_test_db, signed_notification,
};

fn enrollments_of(body: &str) -> usize {
    let courses: serde_json::Value = serde_json::from_str(body).expect("Invalid JSON format");
    courses.as_array().map(Vec::len).unwrap_or_default()
}

#[tokio::test]
async fn checkout_and_settlement_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;
    let course = seed_course(&pool, "Paid", &[1]).await;
    let course_id = course.id;

    Flow::new()
        .step(register_action("liam", "user"))
        .step(login_action("liam"))
        .step(checkout_action(course_id).assert_body(move |body| {
            let checkout: serde_json::Value = serde_json::from_str(body).unwrap();
            assert_eq!(checkout["amount"], COURSE_PRICE);
            assert_eq!(checkout["course_id"], course_id);
            let order_ref = format!("ORDER-{}", checkout["order_id"]);
            assert!(checkout["snap_url"].as_str().unwrap().ends_with(&order_ref));
        }))
        .step(
            settle_action().assert_body(|body| {
                assert!(body.contains("payment notification processed"));
            }),
        )
        // the gateway retries, nothing changes
        .step(
            settle_action().assert_body(|body| {
                assert!(body.contains("already processed"));
            }),
        )
        .step(
            Action::new("my_courses", "GET", "/api/v1/me/courses")
                .assert_body(|body| assert_eq!(enrollments_of(body), 1)),
        )
        // enrolled users cannot buy twice
        .step(
            Action::new("checkout_again", "POST", "/api/v1/checkout")
                .with_body(json!({ "course_id": course_id }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(login_instructor_action())
        .step(
            Action::new("earnings", "GET", "/api/v1/instructor/earnings").assert_body(|body| {
                let rows: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(rows[0]["total_enrollment"], 1);
                assert_eq!(rows[0]["total_revenue"], COURSE_PRICE);
            }),
        )
        // owners cannot buy their own course
        .step(
            Action::new("checkout_own", "POST", "/api/v1/checkout")
                .with_body(json!({ "course_id": course_id }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(login_admin_action())
        .step(
            Action::new("transactions", "GET", "/api/v1/admin/transactions").assert_body(|body| {
                assert!(body.contains("settlement"));
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn tampered_notification_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;
    let course = seed_course(&pool, "Guarded", &[1]).await;

    Flow::new()
        .step(register_action("mia", "user"))
        .step(login_action("mia"))
        .step(checkout_action(course.id))
        // amount changed after signing
        .step(
            Action::new("tampered", "POST", "/api/v1/payment/notification")
                .with_dyn_body(|ctx| {
                    let order_ref = format!("ORDER-{}", ctx.get_i64("checkout", "order_id"));
                    let mut body = signed_notification(&order_ref, "settlement", "150000.00");
                    body["gross_amount"] = json!("1.00");
                    body
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("my_courses", "GET", "/api/v1/me/courses")
                .assert_body(|body| assert_eq!(enrollments_of(body), 0)),
        )
        .step(
            Action::new("missing_signature", "POST", "/api/v1/payment/notification")
                .with_body(json!({ "order_id": "ORDER-1", "transaction_status": "settlement", "gross_amount": "1.00" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("bad_reference", "POST", "/api/v1/payment/notification")
                .with_body(signed_notification("INV-77", "settlement", "1.00"))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unknown_order", "POST", "/api/v1/payment/notification")
                .with_body(signed_notification("ORDER-987654", "settlement", "1.00"))
                .with_expect(StatusCode::NOT_FOUND),
        )
        // a declined payment leaves the buyer without access
        .step(
            Action::new("declined", "POST", "/api/v1/payment/notification").with_dyn_body(|ctx| {
                let order_ref = format!("ORDER-{}", ctx.get_i64("checkout", "order_id"));
                signed_notification(&order_ref, "deny", "150000.00")
            }),
        )
        .step(
            Action::new("my_courses_after_deny", "GET", "/api/v1/me/courses")
                .assert_body(|body| assert_eq!(enrollments_of(body), 0)),
        )
        // a late settlement for a denied order is ignored
        .step(settle_action().assert_body(|body| assert!(body.contains("already processed"))))
        .step(
            Action::new("my_courses_final", "GET", "/api/v1/me/courses")
                .assert_body(|body| assert_eq!(enrollments_of(body), 0)),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn gateway_failure_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server_with_gateway(&pool, StubGateway::refusing()).await;
    let course = seed_course(&pool, "Offline", &[1]).await;

    Flow::new()
        .step(register_action("noah", "user"))
        .step(login_action("noah"))
        .step(
            checkout_action(course.id).with_expect(StatusCode::BAD_GATEWAY),
        )
        .step(login_admin_action())
        .step(
            Action::new("transactions", "GET", "/api/v1/admin/transactions").assert_body(|body| {
                let page: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(page["total"], 1);
                assert_eq!(page["items"][0]["status"], "failed");
            }),
        )
        .run(&mut server, pool)
        .await;
}
