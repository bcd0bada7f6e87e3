//! HTTP server: `/query`, `/process-document`, `/health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use taxlaw_ai::AnswerOrchestrator;
use taxlaw_core::{AnswerResult, DocumentRequest, DocumentText, TaxQuery};
use taxlaw_docs::DocumentClient;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Services shared by every request handler.
pub struct AppState {
    pub orchestrator: AnswerOrchestrator,
    pub documents: DocumentClient,
}

type SharedState = Arc<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query_tax_law))
        .route("/process-document", post(process_document))
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server on `0.0.0.0:<port>` until interrupted.
pub async fn run(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

/// Always answers 200: pipeline failures arrive as the fallback payload.
async fn query_tax_law(
    State(state): State<SharedState>,
    Json(query): Json<TaxQuery>,
) -> Json<AnswerResult> {
    info!(query = %query.query, "received query");
    Json(state.orchestrator.answer(&query).await)
}

async fn process_document(
    State(state): State<SharedState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<DocumentText>, (StatusCode, Json<ErrorDetail>)> {
    state.documents.process(&request).await.map(Json).map_err(|e| {
        let (status, prefix) = if e.is_download() {
            (StatusCode::BAD_REQUEST, "Error downloading document")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "Error processing document")
        };
        error!(error = %e, url = %request.url, "{prefix}");
        (
            status,
            Json(ErrorDetail {
                detail: format!("{prefix}: {e}"),
            }),
        )
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use std::io::{Cursor, Write};

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use taxlaw_ai::fakes::ScriptedModel;
    use taxlaw_store::fakes::{FailingIndex, StaticIndex};
    use taxlaw_store::{ContextRetriever, SearchMatch, VectorIndex};
    use tower::ServiceExt;
    use zip::write::FileOptions;

    const MODEL_OUTPUT: &str = "[TITLE]\nT\n[TAX_CITATIONS]\nITAA 1997 s40-30 | https://legislation.gov.au/x\n";

    fn app(index: Arc<dyn VectorIndex>) -> Router {
        router(AppState {
            orchestrator: AnswerOrchestrator::new(
                ContextRetriever::new(index),
                Arc::new(ScriptedModel::new(MODEL_OUTPUT)),
            ),
            documents: DocumentClient::new(Duration::from_secs(5)).unwrap(),
        })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query_body() -> serde_json::Value {
        serde_json::json!({
            "query": "Is software a capital asset?",
            "title": "", "tax_research": "", "tax_citations": "",
            "draft_client_response": "", "clarifying_questions": "",
            "confirmation": ""
        })
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn query_returns_parsed_answer() {
        let index = Arc::new(StaticIndex::new(vec![SearchMatch::new("ITAA 1997 s40-30", "text")]));
        let resp = app(index)
            .oneshot(post_json("/query", query_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["title"], "T");
        assert_eq!(json["tax_research"], "No research provided");
        assert_eq!(json["citations"][0]["citation_url"], "https://legislation.gov.au/x");
    }

    #[tokio::test]
    async fn query_failure_is_still_ok_with_fallback() {
        let resp = app(Arc::new(FailingIndex::new("down")))
            .oneshot(post_json("/query", query_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["title"], "Error Processing Query");
        assert_eq!(json["citations"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_query_is_rejected() {
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(post_json("/query", serde_json::json!({"query": "q"})))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn undownloadable_document_is_bad_request() {
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(post_json(
                "/process-document",
                serde_json::json!({"url": "not a url", "flow_variable": "doc"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = json_body(resp).await;
        assert!(
            json["detail"]
                .as_str()
                .unwrap()
                .starts_with("Error downloading document: ")
        );
    }

    fn letter_docx() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("word/document.xml", FileOptions::default())
                .unwrap();
            writer
                .write_all(
                    br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Engagement letter</w:t></w:r></w:p><w:p><w:r><w:t>Client: Acme Pty Ltd</w:t></w:r></w:p></w:body></w:document>"#,
                )
                .unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    /// Serve a .docx and a plain-text file on an ephemeral local port.
    async fn serve_files() -> SocketAddr {
        let files = Router::new()
            .route("/letter.docx", get(|| async { letter_docx() }))
            .route("/notes.txt", get(|| async { "plain text, not a docx" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, files).await.unwrap() });
        addr
    }

    #[tokio::test]
    async fn document_text_is_returned_under_flow_variable() {
        let addr = serve_files().await;
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(post_json(
                "/process-document",
                serde_json::json!({
                    "url": format!("http://{addr}/letter.docx"),
                    "flow_variable": "contractText"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            serde_json::json!({
                "status": "success",
                "variable_name": "contractText",
                "text": "Engagement letter\nClient: Acme Pty Ltd",
                "message": "Document processed and stored in contractText"
            })
        );
    }

    #[tokio::test]
    async fn unreadable_document_is_server_error() {
        let addr = serve_files().await;
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(post_json(
                "/process-document",
                serde_json::json!({
                    "url": format!("http://{addr}/notes.txt"),
                    "flow_variable": "doc"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(resp).await;
        assert!(
            json["detail"]
                .as_str()
                .unwrap()
                .starts_with("Error processing document: ")
        );
    }

    #[tokio::test]
    async fn missing_document_is_bad_request() {
        let addr = serve_files().await;
        let resp = app(Arc::new(StaticIndex::new(vec![])))
            .oneshot(post_json(
                "/process-document",
                serde_json::json!({
                    "url": format!("http://{addr}/absent.docx"),
                    "flow_variable": "doc"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
