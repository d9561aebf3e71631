mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::TestApp;

async fn create(app: &TestApp, token: &str, body: Value) -> (StatusCode, Value) {
    app.send(Method::POST, "/api/news", Some(body), Some(token)).await
}

#[tokio::test]
async fn create_requires_auth_and_main_image() {
    let app = TestApp::new();
    let article = json!({"title": "Budget", "description": "Passed", "mainImage": "uploads/b.jpg"});

    let (status, body) = app
        .send(Method::POST, "/api/news", Some(article.clone()), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let (_, token) = app.verified_login("ed@x.com", "pw1", "Ed Okoro").await;
    let (status, body) = create(
        &app,
        &token,
        json!({"title": "Budget", "description": "Passed"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Main image is required");

    let (status, body) = create(&app, &token, article).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "News created successfully!");
    assert_eq!(body["news"]["title"], "Budget");
    assert_eq!(body["news"]["mainImage"], "uploads/b.jpg");
    assert!(body["news"]["createdBy"].is_string());
}

#[tokio::test]
async fn list_filters_by_category_newest_first() {
    let app = TestApp::new();
    let (_, token) = app.verified_login("ed@x.com", "pw1", "Ed Okoro").await;

    let (status, body) = app.send(Method::GET, "/api/news", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "There is no news in the database");
    assert_eq!(body["news"], json!([]));

    for (title, category) in [("a", "sports"), ("b", "politics"), ("c", "sports")] {
        let (status, _) = create(
            &app,
            &token,
            json!({"title": title, "description": "d", "category": category, "mainImage": "m.jpg"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.send(Method::GET, "/api/news", None, None).await;
    assert_eq!(body["message"], "news fetched!");
    assert_eq!(body["news"].as_array().unwrap().len(), 3);
    assert_eq!(body["news"][0]["title"], "c");

    let (_, body) = app
        .send(Method::GET, "/api/news?category=sports", None, None)
        .await;
    let titles: Vec<&str> = body["news"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["c", "a"]);
}

#[tokio::test]
async fn get_update_delete_by_id() {
    let app = TestApp::new();
    let (_, token) = app.verified_login("ed@x.com", "pw1", "Ed Okoro").await;
    let (_, body) = create(
        &app,
        &token,
        json!({"title": "Old", "description": "d", "mainImage": "m.jpg"}),
    )
    .await;
    let id = body["news"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/news/{id}");

    let (status, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news"]["title"], "Old");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(json!({})), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nothing to update");

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({"title": "New", "date": "2025-03-01T09:30:00Z"})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "news update successfully");
    assert_eq!(body["news"]["title"], "New");
    assert_eq!(body["news"]["description"], "d");
    assert_eq!(body["news"]["date"], "2025-03-01T09:30:00Z");

    let (status, body) = app.send(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "News deleted successfully");

    let (status, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("news with this id: {id} not found"));

    let (status, _) = app.send(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = TestApp::new();
    let (_, token) = app.verified_login("ed@x.com", "pw1", "Ed Okoro").await;

    let (status, body) = app.send(Method::GET, "/api/news/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid id");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/news/{}", Uuid::new_v4()),
            Some(json!({"title": "x"})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_paging_is_400_in_error_shape() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/news?limit=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());

    for uri in ["/api/news?limit=-1", "/api/news?offset=-5", "/api/news?limit=-1&offset=-5"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid limit/offset");
    }

    let (status, _) = app
        .send(Method::GET, "/api/news?limit=0&offset=0", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}
