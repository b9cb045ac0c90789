mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{unique, TestApp};

/// Register an account and log in; returns (user id, access token, refresh token).
async fn register_and_login(app: &TestApp, username: &str) -> Result<(i64, String, String)> {
    let (status, body) = app
        .post(
            "/users/",
            None,
            json!({ "username": username, "password": "s3cret", "name": "Flow User", "is_active": false }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"].get("hashed_password").is_none());
    let user_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .post("/token/", None, json!({ "username": username, "password": "s3cret" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["token_type"], "bearer");
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    Ok((user_id, access, refresh))
}

fn text_template(id: &str, name: &str, channel: &str) -> Value {
    json!({
        "id": id,
        "channel_id": channel,
        "account_id": "acc-1",
        "template_name": name,
        "content": { "type": "text", "text": { "body": "hello" }, "ignored": 1 }
    })
}

#[tokio::test]
async fn login_and_token_lifecycle() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let username = unique("login");
    let (user_id, access, refresh) = register_and_login(&app, &username).await?;

    let (status, body) = app
        .post("/token/", None, json!({ "username": username, "password": "wrong" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect username or password");

    let (status, body) = app.get("/users/me", Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(user_id));

    let (status, body) = app.request(Method::POST, "/token/refresh/", Some(&refresh), None).await?;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = app.request(Method::DELETE, "/access/revoke/", Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/users/me", Some(&access)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/users/me", Some(&fresh)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::DELETE, "/refresh/revoke/", Some(&refresh), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Refresh token revoked");
    let (status, _) = app.request(Method::POST, "/token/refresh/", Some(&refresh), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let username = unique("dup");
    register_and_login(&app, &username).await?;

    let (status, body) = app
        .post("/users/", None, json!({ "username": username, "password": "x", "name": "Again" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
    Ok(())
}

#[tokio::test]
async fn user_list_is_paginated() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (_, access, _) = register_and_login(&app, &unique("lister")).await?;

    let (status, body) = app.get("/users/?page=1&size=1", Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["size"], 1);
    assert!(body["meta"]["total"].as_i64().unwrap() >= 1);
    assert_eq!(body["links"]["first"], "/users/?page=1&size=1");
    assert!(body["links"]["prev"].is_null());

    let (status, body) = app.get("/users/?size=0", Some(&access)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["size"].is_string());
    Ok(())
}

#[tokio::test]
async fn template_crud_with_soft_delete() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (_, access, _) = register_and_login(&app, &unique("author")).await?;
    let id = unique("tpl");

    let (status, body) = app.post("/templates/", Some(&access), text_template(&id, "Welcome", "wa")).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["content"]["text"]["body"], "hello");
    assert!(body["data"]["content"].get("ignored").is_none());

    let (status, _) = app.post("/templates/", Some(&access), text_template(&id, "Again", "wa")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/templates/{}", id),
            Some(&access),
            Some(json!({ "template_description": "greeting" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template_description"], "greeting");
    assert_eq!(body["data"]["template_name"], "Welcome");

    let (status, _) = app
        .request(Method::PUT, &format!("/templates/{}", id), Some(&access), Some(json!({})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(Method::DELETE, &format!("/templates/{}", id), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_deleted"], true);

    let (status, _) = app.get(&format!("/templates/{}", id), Some(&access)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .request(Method::DELETE, &format!("/templates/{}", id), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the id stays taken while soft-deleted
    let (status, _) = app.post("/templates/", Some(&access), text_template(&id, "Again", "wa")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(Method::POST, &format!("/templates/{}/restore", id), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_deleted"], false);
    assert!(body["data"]["deleted_at"].is_null());
    Ok(())
}

#[tokio::test]
async fn templates_are_private_to_their_owner() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (_, owner, _) = register_and_login(&app, &unique("owner")).await?;
    let (_, stranger, _) = register_and_login(&app, &unique("stranger")).await?;
    let id = unique("private");

    let (status, _) = app.post("/templates/", Some(&owner), text_template(&id, "Mine", "wa")).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.get(&format!("/templates/{}", id), Some(&stranger)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/templates/", Some(&stranger)).await?;
    assert_eq!(body["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn template_list_filters_and_orders() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (_, access, _) = register_and_login(&app, &unique("filter")).await?;

    // explicit creation times so ordering does not depend on clock resolution
    for (age_minutes, name, channel) in [(30, "Promo Sale", "wa"), (20, "Welcome", "wa"), (10, "promo tg", "tg")] {
        let id = unique("f");
        let (status, _) = app
            .post("/templates/", Some(&access), text_template(&id, name, channel))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
        sqlx::query("UPDATE templates SET created_at = now() - make_interval(mins => $2) WHERE id = $1")
            .bind(&id)
            .bind(age_minutes)
            .execute(app.state.db.pool())
            .await?;
    }

    let (_, body) = app.get("/templates/?channel_id=wa", Some(&access)).await?;
    assert_eq!(body["meta"]["total"], 2);
    // newest first
    assert_eq!(body["data"][0]["template_name"], "Welcome");
    assert_eq!(body["data"][1]["template_name"], "Promo Sale");

    let (_, body) = app.get("/templates/?search=PROMO", Some(&access)).await?;
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = app.get("/templates/?search=promo&channel_id=tg&size=1", Some(&access)).await?;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["links"]["self"], "/templates/?search=promo&channel_id=tg&page=1&size=1");
    Ok(())
}

#[tokio::test]
async fn active_template_assignment_rules() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (user_id, access, _) = register_and_login(&app, &unique("assignee")).await?;
    let first = unique("first");
    let second = unique("second");
    for id in [&first, &second] {
        let (status, _) = app.post("/templates/", Some(&access), text_template(id, "T", "wa")).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": "abc", "template_id": first }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": "missing" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": first }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["channel_id"], "wa");
    assert_eq!(body["data"]["account_id"], "acc-1");

    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": second }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let path = format!("/active-templates/{}", user_id);
    let (status, body) = app
        .request(Method::PUT, &path, Some(&access), Some(json!({ "template_id": second })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template_id"], second.as_str());

    // deleting the assigned template drops the assignment with it
    let (status, _) = app
        .request(Method::DELETE, &format!("/templates/{}", second), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&path, Some(&access)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": first }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.get("/active-templates/?size=100", Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().iter().any(|row| row["template_id"] == first.as_str()));

    let (status, _) = app.request(Method::DELETE, &path, Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request(Method::DELETE, &path, Some(&access), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let email = format!("{}@example.com", unique("mail"));

    let (status, _) = app
        .post(
            "/users/",
            None,
            json!({ "username": unique("first"), "password": "x", "name": "First", "email": email }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/users/",
            None,
            json!({ "username": unique("second"), "password": "x", "name": "Second", "email": email }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");
    Ok(())
}

#[tokio::test]
async fn inactive_user_cannot_log_in_or_use_tokens() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let username = unique("inactive");
    let (user_id, access, _) = register_and_login(&app, &username).await?;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id as i32)
        .execute(app.state.db.pool())
        .await?;

    let (status, body) = app
        .post("/token/", None, json!({ "username": username, "password": "s3cret" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect username or password");

    let (status, _) = app.get("/users/me", Some(&access)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn restoring_a_live_template_is_not_found() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (_, access, _) = register_and_login(&app, &unique("restorer")).await?;
    let id = unique("live");

    let (status, _) = app.post("/templates/", Some(&access), text_template(&id, "Live", "wa")).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(Method::POST, &format!("/templates/{}/restore", id), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn assignments_only_accept_live_templates_of_the_target_user() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else { return Ok(()) };
    let (user_id, access, _) = register_and_login(&app, &unique("target")).await?;
    let (_, other, _) = register_and_login(&app, &unique("other")).await?;

    let own = unique("own");
    let retired = unique("retired");
    let foreign = unique("foreign");
    for id in [&own, &retired] {
        let (status, _) = app.post("/templates/", Some(&access), text_template(id, "Own", "wa")).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app.post("/templates/", Some(&other), text_template(&foreign, "Foreign", "wa")).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .request(Method::DELETE, &format!("/templates/{}", retired), Some(&access), None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    // another user's template cannot be assigned
    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": foreign }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // nor a soft-deleted one
    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": retired }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/active-templates/", Some(&access), json!({ "user_id": user_id.to_string(), "template_id": own }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let path = format!("/active-templates/{}", user_id);
    for template_id in [&foreign, &retired] {
        let (status, _) = app
            .request(Method::PUT, &path, Some(&access), Some(json!({ "template_id": template_id })))
            .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // failed reassignments leave the current one untouched
    let (status, body) = app.get(&path, Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template_id"], own.as_str());
    Ok(())
}
