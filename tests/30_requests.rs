mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

struct Scenario {
    app: TestApp,
    ada_tutor: i64,
    ada: String,
    grace: String,
    bob: String,
}

/// Ada (Math) and Grace (Computing) are tutors with accounts, bob is a student.
async fn scenario() -> Result<Scenario> {
    let app = TestApp::new();
    let ada_tutor = app.register_tutor("ada", "Ada", "Math").await?;
    app.register_tutor("grace", "Grace", "Computing").await?;
    app.register_student("bob").await?;

    Ok(Scenario {
        ada: app.login("ada").await?,
        grace: app.login("grace").await?,
        bob: app.login("bob").await?,
        ada_tutor,
        app,
    })
}

#[tokio::test]
async fn bob_creates_a_pending_request() -> Result<()> {
    let s = scenario().await?;

    let res = s
        .app
        .post(
            &format!("/request/{}", s.ada_tutor),
            Some(&s.bob),
            json!({ "message": "help", "contact_email": "bob@example.com" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["redirect"], "/thankyou");
    assert_eq!(res.data()["request"]["status"], "pending");
    assert_eq!(res.data()["request"]["student_name"], "bob");
    assert_eq!(res.data()["request"]["tutor_id"], s.ada_tutor);

    let res = s.app.get("/?q=math", None).await?;
    assert_eq!(res.data()["tutors"][0]["has_pending_request"], true);
    Ok(())
}

#[tokio::test]
async fn invalid_request_email_is_reported() -> Result<()> {
    let s = scenario().await?;

    let res = s
        .app
        .post(
            &format!("/request/{}", s.ada_tutor),
            Some(&s.bob),
            json!({ "message": "help", "contact_email": "nope" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["field_errors"]["contact_email"].is_string());
    Ok(())
}

#[tokio::test]
async fn owning_tutor_accepts() -> Result<()> {
    let s = scenario().await?;
    let request = s.app.request_tutor(&s.bob, s.ada_tutor).await?;

    let res = s.app.get("/tutor_dashboard", Some(&s.ada)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["tutor"]["id"], s.ada_tutor);
    assert_eq!(res.data()["requests"][0]["id"], request);

    let res = s
        .app
        .post(
            &format!("/handle_request_action/{}", request),
            Some(&s.ada),
            json!({ "action": "accept" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["request"]["status"], "accepted");
    assert_eq!(res.data()["redirect"], "/tutor_dashboard");

    let res = s.app.get("/student_dashboard", Some(&s.bob)).await?;
    assert_eq!(res.data()["requests"][0]["status"], "accepted");

    let res = s.app.get("/?q=math", None).await?;
    assert_eq!(res.data()["tutors"][0]["has_pending_request"], false);
    Ok(())
}

#[tokio::test]
async fn another_tutor_cannot_decide() -> Result<()> {
    let s = scenario().await?;
    let request = s.app.request_tutor(&s.bob, s.ada_tutor).await?;

    let res = s
        .app
        .post(
            &format!("/handle_request_action/{}", request),
            Some(&s.grace),
            json!({ "action": "reject" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = s.app.get("/tutor_dashboard", Some(&s.grace)).await?;
    assert_eq!(res.data()["requests"].as_array().map(Vec::len), Some(0));

    let res = s.app.get("/tutor_dashboard", Some(&s.ada)).await?;
    assert_eq!(res.data()["requests"][0]["status"], "pending");
    Ok(())
}

#[tokio::test]
async fn decisions_are_final() -> Result<()> {
    let s = scenario().await?;
    let request = s.app.request_tutor(&s.bob, s.ada_tutor).await?;
    let uri = format!("/handle_request_action/{}", request);

    let res = s.app.post(&uri, Some(&s.ada), json!({ "action": "Accept" })).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = s.app.post(&uri, Some(&s.ada), json!({ "action": "accept" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["request"]["status"], "accepted");

    let res = s.app.post(&uri, Some(&s.ada), json!({ "action": "reject" })).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["code"], "INVALID_TRANSITION");

    let res = s.app.post(&uri, Some(&s.ada), json!({ "action": "maybe" })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let res = s
        .app
        .post("/handle_request_action/999", Some(&s.ada), json!({ "action": "accept" }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn role_guards_deny_per_role() -> Result<()> {
    let s = scenario().await?;
    let request = s.app.request_tutor(&s.bob, s.ada_tutor).await?;

    // Students are sent back to the directory from tutor pages
    let res = s.app.get("/tutor_dashboard", Some(&s.bob)).await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));

    let res = s
        .app
        .post(
            &format!("/handle_request_action/{}", request),
            Some(&s.bob),
            json!({ "action": "accept" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));

    // Tutors get the fixed student denial
    let res = s.app.get("/student_dashboard", Some(&s.ada)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.text,
        "403 Forbidden: You are not a student and cannot access this page."
    );

    let res = s.app.get("/tutor_dashboard", Some(&s.ada)).await?;
    assert_eq!(res.data()["requests"][0]["status"], "pending");
    Ok(())
}

#[tokio::test]
async fn student_dashboard_lists_only_own_requests() -> Result<()> {
    let s = scenario().await?;
    s.app.register_student("eve").await?;
    let eve = s.app.login("eve").await?;

    s.app.request_tutor(&s.bob, s.ada_tutor).await?;
    s.app.request_tutor(&eve, s.ada_tutor).await?;

    let res = s.app.get("/student_dashboard", Some(&s.bob)).await?;
    let requests = res.data()["requests"].as_array().cloned().unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["student_name"], "bob");
    Ok(())
}
