use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ngramdex::persist::{MetaFile, META_VERSION};
use ngramdex::{Analyzer, AnalyzerConfig, SearchEngine, SledStore, SAMPLE_DOCUMENTS};
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_sample_index(dir: &std::path::Path) {
    let mut engine = SearchEngine::new(Analyzer::default(), SledStore::open(dir).unwrap());
    let summary = engine.index_texts(&SAMPLE_DOCUMENTS).unwrap();
    let meta = MetaFile {
        num_docs: summary.num_docs,
        num_terms: summary.num_terms,
        created_at: "2024-01-01T00:00:00Z".into(),
        version: META_VERSION,
        analyzer: AnalyzerConfig::default(),
    };
    engine.store().save_meta(&meta).unwrap();
    // engine drops here, releasing the sled lock
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_sample_index(dir.path());
    let app = ngramdex_server::build_app(dir.path().to_string_lossy().to_string()).unwrap();

    let (status, body) = call(app, "/search?q=nausea%20and%20dizziness&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64(), Some(4));
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64(), Some(2));
    assert_eq!(arr[0]["score"].as_f64(), Some(0.41));
    assert_eq!(arr[1]["doc_id"].as_u64(), Some(3));
    assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>nausea</em>"));
}

#[tokio::test]
async fn doc_lookup_and_missing_doc() {
    let dir = tempdir().unwrap();
    build_sample_index(dir.path());
    let app = ngramdex_server::build_app(dir.path().to_string_lossy().to_string()).unwrap();

    let (status, body) = call(app.clone(), "/doc/3").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["content"].as_str(), Some(SAMPLE_DOCUMENTS[2]));

    let (status, _) = call(app, "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn missing_index_fails_fast() {
    let dir = tempdir().unwrap();
    assert!(ngramdex_server::build_app(dir.path().to_string_lossy().to_string()).is_err());
}
