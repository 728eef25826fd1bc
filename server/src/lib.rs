use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use ngramdex::{Analyzer, DocId, IndexError, IndexStore, SearchEngine, SledStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub content: String,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine<SledStore>>,
    pub num_docs: u32,
}

type ApiError = (StatusCode, String);

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub fn build_app(db_dir: String) -> Result<Router> {
    // Fail fast if the store or its metadata is unavailable
    let store = SledStore::open(&db_dir)?;
    let meta = store.load_meta()?.ok_or_else(|| IndexError::MissingMeta(db_dir.clone()))?;
    let engine = SearchEngine::new(Analyzer::new(meta.analyzer), store);
    let app_state = AppState { engine: Arc::new(engine), num_docs: meta.num_docs };
    tracing::info!(db = %db_dir, num_docs = meta.num_docs, num_terms = meta.num_terms, "index loaded");

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let ranked = state.engine.search(&params.q).map_err(internal)?;
    let total_hits = ranked.len();
    let k = params.k.clamp(1, 100);

    let raw_terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_string()).collect();
    let results = ranked
        .into_iter()
        .take(k)
        .map(|r| {
            let snippet = snippet_from_text(&r.content, &raw_terms);
            SearchHit { doc_id: r.doc_id, score: r.score, content: r.content, snippet }
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, took_s = elapsed.as_secs_f64(), "search served");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.engine.store().document(doc_id).map_err(internal)? {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc.id,
            "content": doc.content,
            "num_docs": state.num_docs,
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

const SNIPPET_BEFORE: usize = 60;
const SNIPPET_LEN: usize = 160;

fn snippet_from_text(text: &str, raw_terms: &[String]) -> Option<String> {
    if text.is_empty() { return None; }
    // match on `text` itself so the offset is a char boundary of `text`
    let first_idx = raw_terms
        .iter()
        .filter_map(|t| term_pattern(t))
        .find_map(|pat| pat.find(text).map(|m| m.start()));
    let start_char = first_idx
        .map(|idx| text[..idx].chars().count().saturating_sub(SNIPPET_BEFORE))
        .unwrap_or(0);
    let snippet: String = text.chars().skip(start_char).take(SNIPPET_LEN).collect();
    Some(highlight_terms(&snippet, raw_terms))
}

fn term_pattern(term: &str) -> Option<regex::Regex> {
    if term.trim().is_empty() { return None; }
    regex::RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut s = snippet.to_string();
    for t in terms {
        let Some(pat) = term_pattern(t) else { continue };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}
