use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use video_captioner_rust::error::CaptionError;
use video_captioner_rust::media::FfmpegToolchain;
use video_captioner_rust::model::WhisperModel;
use video_captioner_rust::pipeline;
use video_captioner_rust::session;
use video_captioner_rust::stt::WhisperCppTranscriber;
use video_captioner_rust::style::StyleInput;

struct AppState {
    workspace_root: PathBuf,
    toolchain: FfmpegToolchain,
    transcriber: WhisperCppTranscriber,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct UploadResponse {
    status: &'static str,
    message: &'static str,
    video_id: String,
    filename: String,
}

#[derive(Serialize)]
struct CaptionsResponse {
    status: &'static str,
    message: &'static str,
    subtitle_file: String,
}

#[derive(Serialize)]
struct BurnResponse {
    status: &'static str,
    message: &'static str,
    output_file: String,
}

#[derive(Deserialize)]
struct BurnRequest {
    video_filename: String,
    subtitle_filename: String,
    #[serde(flatten)]
    style: StyleInput,
}

#[derive(Deserialize)]
struct DownloadParams {
    session_id: String,
    filename: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

fn caption_error(err: CaptionError) -> ApiError {
    match &err {
        CaptionError::Timeout { .. } => api_error(
            StatusCode::GATEWAY_TIMEOUT,
            "Processing timed out. Try a shorter video.",
        ),
        CaptionError::InvalidSessionId => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn session_id_header(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("X-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing X-Session-Id header."))
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<String, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("Missing {} header.", name)))
}

/// File names always come from clients; keep only the final path component.
fn safe_filename(name: &str) -> Option<String> {
    let name = Path::new(name).file_name()?.to_string_lossy().to_string();
    if name.is_empty() || name.starts_with('.') {
        None
    } else {
        Some(name)
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Backend is running",
    })
}

async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let session_id = session_id_header(&headers)?;
    let session_folder =
        session::session_dir(&state.workspace_root, &session_id).map_err(caption_error)?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if !field.content_type().unwrap_or("").starts_with("video/") {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Only video files are allowed.",
            ));
        }

        let ext = field
            .file_name()
            .and_then(|name| Path::new(name).extension())
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string());
        let video_id = Uuid::new_v4().to_string();
        let filename = format!("{}.{}", video_id, ext);
        let saved_path = session_folder.join(&filename);

        let mut out_file = tokio::fs::File::create(&saved_path)
            .await
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
        {
            out_file
                .write_all(&chunk)
                .await
                .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        }

        return Ok(Json(UploadResponse {
            status: "ok",
            message: "Video uploaded successfully.",
            video_id,
            filename,
        }));
    }

    Err(api_error(StatusCode::BAD_REQUEST, "Missing 'file' field."))
}

async fn generate_captions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CaptionsResponse>, ApiError> {
    let session_id = session_id_header(&headers)?;
    let video_filename = header_value(&headers, "X-Video-Filename")?;
    let session_folder =
        session::session_dir(&state.workspace_root, &session_id).map_err(caption_error)?;

    let video_name = safe_filename(&video_filename)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid video filename."))?;
    let video_path = session_folder.join(&video_name);
    if !video_path.exists() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "Video not found for this session.",
        ));
    }

    let srt_path = pipeline::extract_and_transcribe(
        &state.toolchain,
        &state.transcriber,
        &video_path,
        &session_folder,
    )
    .await
    .map_err(caption_error)?;

    let subtitle_file = srt_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Json(CaptionsResponse {
        status: "ok",
        message: "Subtitles generated successfully.",
        subtitle_file,
    }))
}

async fn generate_captioned_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<BurnRequest>,
) -> Result<Json<BurnResponse>, ApiError> {
    let session_id = session_id_header(&headers)?;
    let session_folder =
        session::session_dir(&state.workspace_root, &session_id).map_err(caption_error)?;

    let video_name = safe_filename(&req.video_filename)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid video filename."))?;
    let subtitle_name = safe_filename(&req.subtitle_filename)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid subtitle filename."))?;

    let video_path = session_folder.join(&video_name);
    if !video_path.exists() {
        return Err(api_error(StatusCode::NOT_FOUND, "Video not found."));
    }
    let subtitle_path = session_folder.join(&subtitle_name);
    if !subtitle_path.exists() {
        return Err(api_error(StatusCode::NOT_FOUND, "Subtitle file not found."));
    }

    let destination = session_folder.join(pipeline::OUTPUT_FILENAME);
    pipeline::burn(
        &state.toolchain,
        &video_path,
        &subtitle_path,
        &req.style,
        &destination,
    )
    .await
    .map_err(caption_error)?;

    Ok(Json(BurnResponse {
        status: "ok",
        message: "Captioned video generated successfully.",
        output_file: pipeline::OUTPUT_FILENAME.to_string(),
    }))
}

async fn download_video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let session_folder =
        session::session_dir(&state.workspace_root, &params.session_id).map_err(caption_error)?;
    let name = safe_filename(&params.filename)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid filename."))?;

    let file_path = session_folder.join(&name);
    if !file_path.exists() {
        return Err(api_error(StatusCode::NOT_FOUND, "File not found."));
    }

    let bytes = tokio::fs::read(&file_path)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    ))
}

pub async fn start_server(
    port: u16,
    workspace_root: PathBuf,
    model: WhisperModel,
    language: &str,
    process_timeout: Duration,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(&workspace_root)?;

    let transcriber = WhisperCppTranscriber::new(model, language).await?;
    let state = Arc::new(AppState {
        workspace_root: workspace_root.clone(),
        toolchain: FfmpegToolchain::new(process_timeout),
        transcriber,
    });

    // Sweep expired session workspaces for the life of the server.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(session::SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = session::cleanup_expired(&workspace_root, session::SESSION_TTL) {
                tracing::warn!(error = %e, "session cleanup failed");
            }
        }
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload_video))
        .route("/generate-captions", post(generate_captions))
        .route("/generate-captioned-video", post(generate_captioned_video))
        .route("/download", get(download_video))
        .layer(DefaultBodyLimit::max(1024 * 1024 * 1024)) // uploads are whole videos
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
