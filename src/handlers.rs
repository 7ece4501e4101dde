use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use roget_db::{Node, NodeId, NodeKind, Thesaurus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone)]
pub struct AppState {
    pub thesaurus: Arc<Thesaurus>,
}

#[derive(Deserialize)]
pub struct SimilarityQuery {
    pub a: Option<String>,
    pub b: Option<String>,
}

#[derive(Deserialize)]
pub struct SensesQuery {
    pub key: Option<String>,
}

/// Flat description of one node.
#[derive(Serialize)]
pub struct NodeSummary {
    id: u32,
    kind: NodeKind,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_comment: Option<String>,
}

impl From<Node<'_>> for NodeSummary {
    fn from(node: Node<'_>) -> Self {
        Self {
            id: node.id().0,
            kind: node.kind(),
            key: node.key().to_string(),
            index: node.index().map(str::to_string),
            description: node.description().map(str::to_string),
            word_type: node.word_type().abbreviation(),
            comment: node.comment().map(str::to_string),
            link: node.link().map(|target| target.id().0),
            link_comment: node.link_comment().map(str::to_string),
        }
    }
}

#[derive(Serialize)]
pub struct SimilarityResponse {
    a: String,
    b: String,
    score: u8,
    node: Option<NodeSummary>,
}

#[derive(Serialize)]
pub struct SensesResponse {
    key: String,
    items: Vec<SenseItem>,
}

#[derive(Serialize)]
pub struct SenseItem {
    #[serde(flatten)]
    node: NodeSummary,
    parent: Option<u32>,
}

#[derive(Serialize)]
pub struct HeadWordResponse {
    #[serde(flatten)]
    head_word: NodeSummary,
    parent: Option<u32>,
    children: Vec<HeadWordChild>,
}

/// A sense group with its senses, or a sense standing alone.
#[derive(Serialize)]
pub struct HeadWordChild {
    #[serde(flatten)]
    node: NodeSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    senses: Vec<NodeSummary>,
}

#[derive(Serialize)]
pub struct NodeResponse {
    #[serde(flatten)]
    node: NodeSummary,
    parent: Option<u32>,
    children: Vec<u32>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/similarity", get(similarity))
        .route("/v1/senses", get(senses))
        .route("/v1/headwords/{index}", get(head_word))
        .route("/v1/nodes/{id}", get(node))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn similarity(
    State(state): State<AppState>,
    Query(params): Query<SimilarityQuery>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let a = required("a", params.a)?;
    let b = required("b", params.b)?;
    let sim = state.thesaurus.similarity(&a, &b);
    Ok(Json(SimilarityResponse {
        score: sim.score,
        node: sim.node.map(NodeSummary::from),
        a,
        b,
    }))
}

async fn senses(
    State(state): State<AppState>,
    Query(params): Query<SensesQuery>,
) -> Result<Json<SensesResponse>, ApiError> {
    let key = required("key", params.key)?;
    let items = state
        .thesaurus
        .senses(&key)
        .into_iter()
        .map(|node| SenseItem {
            parent: node.parent().map(|p| p.id().0),
            node: node.into(),
        })
        .collect();
    Ok(Json(SensesResponse { key, items }))
}

async fn head_word(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<HeadWordResponse>, ApiError> {
    let head = state
        .thesaurus
        .head_word(&index)
        .ok_or_else(|| ApiError::NotFound(format!("no headword #{index}")))?;
    let children = head
        .children()
        .map(|child| HeadWordChild {
            senses: match child.kind() {
                NodeKind::SenseGroup => child.children().map(NodeSummary::from).collect(),
                _ => Vec::new(),
            },
            node: child.into(),
        })
        .collect();
    Ok(Json(HeadWordResponse {
        parent: head.parent().map(|p| p.id().0),
        head_word: head.into(),
        children,
    }))
}

async fn node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<NodeResponse>, ApiError> {
    let id: u32 = raw
        .parse()
        .map_err(|_| ApiError::bad_request(format!("node id must be a number, got {raw:?}")))?;
    let node = state
        .thesaurus
        .node(NodeId(id))
        .ok_or_else(|| ApiError::NotFound(format!("no node {id}")))?;
    Ok(Json(NodeResponse {
        parent: node.parent().map(|p| p.id().0),
        children: node.children().map(|c| c.id().0).collect(),
        node: node.into(),
    }))
}

fn required(name: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(format!("{name} is required"))),
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
