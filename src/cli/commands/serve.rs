//! HTTP API server for podcast fact-checking.
//!
//! Accepts analysis submissions, exposes polling, download, and cancel
//! endpoints over the durable task snapshots.

use crate::audio_source::AudioSource;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::task::{
    AnalyzeRequest, Credentials, JsonTaskStore, LivePipeline, TaskManager,
};
use crate::transcription::WhisperTranscriber;
use crate::trusted::TrustedSources;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

/// Shared application state.
struct AppState {
    manager: Arc<TaskManager>,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

    let csv_path = settings.trusted_csv_path();
    let trusted = if csv_path.exists() {
        TrustedSources::load(&csv_path, settings.trusted_sources.threshold)?
    } else {
        Output::warning(&format!(
            "No trusted sources file at {}, sources will not be annotated",
            csv_path.display()
        ));
        TrustedSources::default()
    };

    let transcriber = Arc::new(WhisperTranscriber::with_model(&settings.transcription.model));
    let store = Arc::new(JsonTaskStore::new(&settings.outputs_dir())?);
    let pipeline = Arc::new(LivePipeline::new(
        settings.clone(),
        prompts,
        transcriber,
        Arc::new(trusted),
    ));
    let manager = Arc::new(TaskManager::new(pipeline, store));

    let state = Arc::new(AppState { manager, settings });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/result/{task_id}", get(result))
        .route("/download/{task_id}", get(download))
        .route("/cancel/{task_id}", post(cancel))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Granska API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze");
    Output::kv("Result", "GET  /result/:task_id");
    Output::kv("Download", "GET  /download/:task_id");
    Output::kv("Cancel", "POST /cancel/:task_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct SubmitResponse {
    task_id: Uuid,
    message: String,
}

#[derive(Serialize)]
struct CancelResponse {
    task_id: Uuid,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Submit an analysis as a multipart form: either a `file` part or an
/// `rss_url` field, plus both API keys. Returns the task id immediately;
/// the pipeline runs in the background.
async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut rss_url: Option<String> = None;
    let mut openai_key: Option<String> = None;
    let mut perplexity_key: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Malformed multipart body: {}", e)),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.mp3".to_string());
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                    Err(e) => return bad_request(format!("Failed to read upload: {}", e)),
                }
            }
            Some("rss_url") => {
                rss_url = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            Some("api_key_openai") => {
                openai_key = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            Some("api_key_perplexity") => {
                perplexity_key = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let credentials = match Credentials::new(openai_key, perplexity_key) {
        Ok(credentials) => credentials,
        Err(e) => return bad_request(e.to_string()),
    };

    let source = if let Some((file_name, bytes)) = file {
        let uploads_dir = state.settings.uploads_dir();
        let path = uploads_dir.join(format!("{}_{}", Uuid::new_v4(), file_name));
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to store upload: {}", e),
                }),
            )
                .into_response();
        }
        AudioSource::Local { path, file_name }
    } else if let Some(url) = rss_url {
        AudioSource::Rss { url }
    } else {
        return bad_request("Either a file or an rss_url is required");
    };

    let task_id = state.manager.submit(AnalyzeRequest {
        source,
        credentials,
    });

    Json(SubmitResponse {
        task_id,
        message: "Task started. Wait a few seconds and fetch result by task_id.".to_string(),
    })
    .into_response()
}

/// Poll a task's snapshot. Unknown ids report as processing: the snapshot is
/// the only state, so "never submitted" and "not yet written" look alike.
async fn result(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.manager.status(task_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Download a task's result document as a JSON attachment. Unlike polling,
/// a missing document is a 404 here.
async fn download(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.manager.store().read_raw(task_id).await {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"factcheck_{}.json\"", task_id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "File not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Request cancellation of a running task. Always acknowledged, even for
/// unknown or already-finished tasks.
async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    state.manager.cancel(task_id);
    Json(CancelResponse {
        task_id,
        message: "Cancel requested".to_string(),
    })
}
