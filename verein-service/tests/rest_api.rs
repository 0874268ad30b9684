//! REST interface driven through the router

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use verein_service::prelude::*;

fn app() -> Router {
    let store = Arc::new(MemoryClubStore::with_demo_data());
    router(AppState::new(Config::default(), store))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn write(method: &str, uri: &str, roles: Option<&str>, if_match: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(roles) = roles {
        builder = builder.header("x-roles", roles);
    }
    if let Some(tag) = if_match {
        builder = builder.header(header::IF_MATCH, tag);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(uri: &str, roles: Option<&str>) -> Request<Body> {
    let mut builder = Request::delete(uri);
    if let Some(roles) = roles {
        builder = builder.header("x-roles", roles);
    }
    builder.body(Body::empty()).unwrap()
}

fn club_body(name: &str) -> Value {
    json!({
        "name": name,
        "memberCount": 1200,
        "website": "https://testverein.example",
        "foundingDate": "1999-05-01",
        "category": "AMATEUR",
        "keywords": ["WOMEN"],
        "stadium": {"city": "Karlsruhe", "capacity": 2500},
        "players": [
            {"firstName": "Max", "lastName": "Mustermann", "age": 21, "preferredFoot": "LEFT"}
        ]
    })
}

#[tokio::test]
async fn find_by_id_returns_club_with_etag() {
    let app = app();
    let response = send(&app, get("/rest/1")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::ETAG), Some("\"1\""));
    let club = body_json(response).await;
    assert_eq!(club["name"], "FC Bayern München");
    assert_eq!(club["version"], 1);
    assert_eq!(club["stadium"]["city"], "München");
    assert!(club.get("players").is_none());
}

#[tokio::test]
async fn find_by_id_loads_players_on_request() {
    let app = app();
    let response = send(&app, get("/rest/1?withPlayers=true")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let club = body_json(response).await;
    assert_eq!(club["players"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn conditional_get_honors_if_none_match() {
    let app = app();

    let current = Request::get("/rest/1")
        .header(header::IF_NONE_MATCH, "\"1\"")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, current).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(header_value(&response, header::ETAG), Some("\"1\""));

    let stale = Request::get("/rest/1")
        .header(header::IF_NONE_MATCH, "\"0\"")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, stale).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::ETAG), Some("\"1\""));
}

#[tokio::test]
async fn etag_stops_matching_after_update() {
    let app = app();
    let before = send(&app, get("/rest/1")).await;
    assert_eq!(header_value(&before, header::ETAG), Some("\"1\""));

    let body = json!({"name": "FC Bayern München", "memberCount": 310000});
    let response = send(&app, write("PUT", "/rest/1", Some("user"), Some("\"1\""), &body)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let revalidate = Request::get("/rest/1")
        .header(header::IF_NONE_MATCH, "\"1\"")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, revalidate).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::ETAG), Some("\"2\""));
    assert_eq!(body_json(response).await["memberCount"], 310000);
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let app = app();
    assert_eq!(send(&app, get("/rest/999")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/rest/abc")).await.status(), StatusCode::NOT_FOUND);

    let body = body_json(send(&app, get("/rest/999")).await).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn unsupported_accept_is_not_acceptable() {
    let app = app();
    let request = Request::get("/rest/1")
        .header(header::ACCEPT, "image/png")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn list_without_filter_is_paged() {
    let app = app();
    let response = send(&app, get("/rest")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["content"].as_array().map(Vec::len), Some(5));
    assert_eq!(page["page"]["totalElements"], 6);
    assert_eq!(page["page"]["totalPages"], 2);
    assert_eq!(page["page"]["number"], 0);

    let second = body_json(send(&app, get("/rest?page=1&size=5")).await).await;
    assert_eq!(second["content"].as_array().map(Vec::len), Some(1));
    assert_eq!(second["content"][0]["name"], "SC Freiburg");
}

#[tokio::test]
async fn list_filters_by_name_substring() {
    let app = app();
    let response = send(&app, get("/rest?name=bayern")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    let names: Vec<&str> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["FC Bayern München", "FC Bayern Alzenau"]);
    assert_eq!(page["page"]["totalElements"], 2);
}

#[tokio::test]
async fn list_combines_conditions() {
    let app = app();
    let page = body_json(send(&app, get("/rest?memberCount=100000&youthAcademy=true")).await).await;
    let names: Vec<&str> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["FC Bayern München", "Borussia Dortmund"]);
}

#[tokio::test]
async fn list_rejects_unknown_search_parameter() {
    let app = app();
    let response = send(&app, get("/rest?foo=bar")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["violations"][0]["field"], "foo");
}

#[tokio::test]
async fn list_rejects_invalid_category() {
    let app = app();
    let response = send(&app, get("/rest?category=EPUB")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_rejects_unrepresentable_founding_year() {
    let app = app();
    let response = send(&app, get("/rest?foundingYear=99999999")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["violations"][0]["field"], "foundingYear");
}

#[tokio::test]
async fn list_without_matches_is_not_found() {
    let app = app();
    assert_eq!(send(&app, get("/rest?name=xyz")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/rest?page=9")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_requires_roles() {
    let app = app();
    let body = club_body("Testverein-X");

    let response = send(&app, write("POST", "/rest", None, None, &body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, write("POST", "/rest", Some("guest"), None, &body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_then_delete_is_idempotent() {
    let app = app();
    let response = send(
        &app,
        write("POST", "/rest", Some("user"), None, &club_body("Testverein-X")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = header_value(&response, header::LOCATION).unwrap().to_string();
    assert_eq!(location, "/rest/61");
    assert_eq!(header_value(&response, header::ETAG), Some("\"0\""));

    let created = body_json(send(&app, get(&format!("{location}?withPlayers=true"))).await).await;
    assert_eq!(created["version"], 0);
    assert_eq!(created["name"], "Testverein-X");
    assert_eq!(created["players"][0]["lastName"], "Mustermann");

    let response = send(&app, delete(&location, Some("user"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let response = send(&app, delete(&location, Some("admin"))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    assert_eq!(send(&app, get(&location)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_taken_name() {
    let app = app();
    let response = send(
        &app,
        write("POST", "/rest", Some("admin"), None, &club_body("SC Freiburg")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn create_reports_all_violations() {
    let app = app();
    let body = json!({
        "name": "",
        "email": "not-an-address",
        "stadium": {"city": "Berlin", "capacity": 250000},
        "players": [{"firstName": "Jo", "lastName": "Kid", "age": 12, "preferredFoot": "LEFT"}]
    });
    let response = send(&app, write("POST", "/rest", Some("admin"), None, &body)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    for expected in ["name", "email", "stadium.capacity", "players[0].age"] {
        assert!(fields.contains(&expected), "missing {expected} in {fields:?}");
    }
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app();
    let request = Request::post("/rest")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-roles", "admin")
        .body(Body::from("{\"name\": "))
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_is_version_guarded() {
    let app = app();
    let body = json!({"name": "FC Bayern München", "memberCount": 310000});

    let response = send(&app, write("PUT", "/rest/1", Some("user"), Some("\"1\""), &body)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(header_value(&response, header::ETAG), Some("\"2\""));

    let stale = send(&app, write("PUT", "/rest/1", Some("user"), Some("\"1\""), &body)).await;
    assert_eq!(stale.status(), StatusCode::PRECONDITION_FAILED);
    let error = body_json(stale).await;
    assert_eq!(error["error"], "Version \"1\" is outdated");

    let club = body_json(send(&app, get("/rest/1")).await).await;
    assert_eq!(club["version"], 2);
    assert_eq!(club["memberCount"], 310000);
}

#[tokio::test]
async fn update_without_if_match_is_precondition_required() {
    let app = app();
    let body = json!({"name": "FC Bayern München"});
    let response = send(&app, write("PUT", "/rest/1", Some("admin"), None, &body)).await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    let error = body_json(response).await;
    assert_eq!(error["error"], "Header \"If-Match\" is missing");
}

#[tokio::test]
async fn update_with_malformed_or_future_version_fails() {
    let app = app();
    let body = json!({"name": "FC Bayern München"});

    let malformed = send(&app, write("PUT", "/rest/1", Some("admin"), Some("abc"), &body)).await;
    assert_eq!(malformed.status(), StatusCode::PRECONDITION_FAILED);

    let ahead = send(&app, write("PUT", "/rest/1", Some("admin"), Some("\"7\""), &body)).await;
    assert_eq!(ahead.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn update_of_absent_club_is_not_found() {
    let app = app();
    let body = json!({"name": "Phantom FC"});
    let response = send(&app, write("PUT", "/rest/999", Some("admin"), Some("\"0\""), &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_name_of_another_club() {
    let app = app();
    let body = json!({"name": "SC Freiburg"});
    let response = send(&app, write("PUT", "/rest/20", Some("admin"), Some("\"0\""), &body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_updates_have_a_single_winner() {
    let app = app();
    let body = json!({"name": "Borussia Dortmund", "memberCount": 230000});

    let attempts = (0..8).map(|_| {
        let app = app.clone();
        let request = write("PUT", "/rest/20", Some("user"), Some("\"0\""), &body);
        tokio::spawn(async move { app.oneshot(request).await.unwrap().status() })
    });
    let statuses = futures::future::join_all(attempts).await;

    let winners = statuses
        .iter()
        .filter(|s| *s.as_ref().unwrap() == StatusCode::NO_CONTENT)
        .count();
    let losers = statuses
        .iter()
        .filter(|s| *s.as_ref().unwrap() == StatusCode::PRECONDITION_FAILED)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 7);

    let club = body_json(send(&app, get("/rest/20")).await).await;
    assert_eq!(club["version"], 1);
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app();
    let health = send(&app, get("/health")).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], "healthy");

    let ready = send(&app, get("/ready")).await;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(body_json(ready).await["ready"], true);
}
