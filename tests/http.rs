use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use roget::handlers::{AppState, router};
use roget_db::Thesaurus;

const SAMPLE: &str = "CLASS I\nAbstract relations\n\nExistence-section\n\n\
    1. Existence -- N. being, entity, reality.\n\n\
    2. Inexistence -- N. nonexistence, nonentity; &c 1.\n\n\
    Other-section\n\n\
    3. Substantiality -- N. substance; thing.\n";

fn make_state() -> AppState {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("roget.txt");
    std::fs::write(&path, SAMPLE).unwrap();
    let thesaurus = Thesaurus::load(&path).unwrap();
    AppState {
        thesaurus: Arc::new(thesaurus),
    }
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn similarity_reports_score_and_ancestor() {
    let (status, body) = get("/v1/similarity?a=being&b=entity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["a"], "being");
    assert_eq!(body["b"], "entity");
    assert_eq!(body["score"], 100);
    assert_eq!(body["node"]["kind"], "SenseGroup");

    let (status, body) = get("/v1/similarity?a=being&b=Inexistence").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 80);
    assert_eq!(body["node"]["key"], "Existence-section");
}

#[tokio::test]
async fn similarity_of_unrelated_or_unknown_keys_is_zero() {
    let (status, body) = get("/v1/similarity?a=being&b=thing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
    assert!(body["node"].is_null());

    let (_, body) = get("/v1/similarity?a=being&b=missing").await;
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn similarity_requires_both_keys() {
    let (status, body) = get("/v1/similarity?a=being").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "b is required");

    let (status, _) = get("/v1/similarity?a=%20&b=being").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn senses_lists_every_node_under_a_key() {
    let (status, body) = get("/v1/senses?key=Existence").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "HeadWord");
    assert_eq!(items[0]["index"], "1");
    assert_eq!(items[1]["kind"], "Sense");
    assert_eq!(items[1]["link"], items[0]["id"]);

    let (status, body) = get("/v1/senses?key=missing").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());

    let (status, _) = get("/v1/senses").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn headword_lists_groups_and_senses() {
    let (status, body) = get("/v1/headwords/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "Inexistence");
    assert_eq!(body["word_type"], serde_json::Value::Null);
    let children = body["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["kind"], "SenseGroup");
    let senses = children[0]["senses"].as_array().unwrap();
    assert_eq!(senses[0]["key"], "nonexistence");
    assert_eq!(senses[0]["word_type"], "N");
    assert_eq!(children[1]["kind"], "Sense");
    assert_eq!(children[1]["key"], "Existence");
    assert!(children[1].get("senses").is_none());

    let (status, body) = get("/v1/headwords/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no headword #99");
}

#[tokio::test]
async fn nodes_expose_parent_and_children() {
    let (status, body) = get("/v1/nodes/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "Category");
    assert_eq!(body["description"], "root");
    assert!(body["parent"].is_null());
    assert_eq!(body["children"], serde_json::json!([1]));

    let (_, body) = get("/v1/nodes/1").await;
    assert_eq!(body["parent"], 0);
    assert_eq!(body["key"], "Abstract relations");

    let (status, _) = get("/v1/nodes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get("/v1/nodes/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
