//! HTTP surface of the gateway
//!
//! `POST /api/chat` runs the full request gate. Every other `/api/*` route
//! except the `GET /api/chat` liveness check only requires a valid
//! `X-API-Key`.

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use skillgate_gate::{key_preview, GateRequest, UNKNOWN_CLIENT};
use skillgate_skills::{bundle::SKILL_FILE, discover_bundles};
use skillgate_types::{MessagesRequest, UploadFile};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the client credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Largest single file accepted in a skill upload
pub const MAX_SKILL_FILE_BYTES: usize = 8 * 1024 * 1024;

/// Body limit for the multipart skill upload route
const MAX_UPLOAD_BODY_BYTES: usize = 64 * 1024 * 1024;

type ApiResult<T> = Result<T, ApiError>;

/// Build the Axum router.
pub fn build_router(state: Arc<AppState>, cors: bool) -> Router {
    let managed = Router::new()
        .route(
            "/api/skills",
            get(list_provider_skills_handler)
                .post(create_skill_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/skills/registry", get(registry_handler))
        .route(
            "/api/skills/upload",
            get(list_bundles_handler).post(upload_bundles_handler),
        )
        .route(
            "/api/skills/{skill_id}",
            get(get_skill_handler).delete(delete_skill_handler),
        )
        .route(
            "/api/skills/{skill_id}/versions",
            get(list_skill_versions_handler)
                .post(create_skill_version_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/skills/{skill_id}/versions/{version}",
            delete(delete_skill_version_handler),
        )
        .route("/api/files", get(list_files_handler))
        .route(
            "/api/files/{file_id}",
            get(get_file_handler).delete(delete_file_handler),
        )
        .route("/api/files/{file_id}/content", get(download_file_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mut router = Router::new()
        .route("/api/chat", get(chat_status_handler).post(chat_handler))
        .merge(managed)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Origin of the caller as reported by a fronting proxy
fn client_address(headers: &HeaderMap) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str("x-real-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Middleware that checks `X-API-Key` against the allow-list.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if let Err(e) = state.gate.authenticate(api_key(request.headers())) {
        warn!(path = %request.uri().path(), "Unauthorized API request: {}", e);
        return Err(e.into());
    }
    Ok(next.run(request).await)
}

// ── Chat ───────────────────────────────────────────────────────

async fn chat_status_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "SkillGate API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let request_id = Uuid::new_v4();
    let credential = api_key(&headers);
    let address = client_address(&headers);

    let admission = state
        .gate
        .check(&GateRequest {
            credential,
            client_address: &address,
            body: &body,
        })
        .map_err(|e| {
            warn!(
                %request_id,
                client = %key_preview(credential.unwrap_or(&address)),
                kind = e.kind(),
                "Chat request refused: {}",
                e
            );
            ApiError::from(e)
        })?;

    info!(
        %request_id,
        client = %key_preview(&admission.client_id),
        window_count = admission.request_count,
        messages = admission.messages.len(),
        "Chat request admitted"
    );

    let request = MessagesRequest::new(
        state.chat.model.clone(),
        state.chat.max_tokens,
        admission.messages,
    )
    .with_system(state.combined.system_prompt.clone())
    .with_tools(state.combined.tools.clone());

    match state.provider.create_message(&request).await {
        Ok(message) => Ok(Json(json!({ "success": true, "data": message }))),
        Err(e) => Err(ApiError::upstream(
            "An error occurred processing your request",
            &e,
        )),
    }
}

// ── Skills ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SkillListParams {
    source: Option<String>,
}

/// Administrative view of the built-in skill registry
async fn registry_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let skills: Vec<Value> = state
        .registry
        .all()
        .iter()
        .map(|skill| {
            json!({
                "id": skill.id,
                "name": skill.name,
                "description": skill.description,
                "enabled": skill.enabled,
                "priority": skill.priority,
                "toolCount": skill.tools.len(),
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "skills": skills,
            "enabledOrder": state.combined.skill_ids(),
            "tools": state.combined.tools,
        },
        "count": skills.len(),
    }))
}

async fn list_provider_skills_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkillListParams>,
) -> ApiResult<Json<Value>> {
    let skills = state
        .provider
        .list_skills()
        .await
        .map_err(|e| ApiError::upstream("Failed to list skills", &e))?;

    let filtered: Vec<_> = match params.source.as_deref() {
        Some(source @ ("custom" | "anthropic")) => skills
            .into_iter()
            .filter(|s| s.source.as_deref() == Some(source))
            .collect(),
        _ => skills,
    };

    Ok(Json(json!({
        "success": true,
        "count": filtered.len(),
        "data": filtered,
    })))
}

/// Read the `files` parts of a skill upload.
///
/// Every file must fit in [`MAX_SKILL_FILE_BYTES`] and one of them must be
/// named `SKILL.md`.
async fn read_skill_files(mut multipart: Multipart) -> ApiResult<Vec<UploadFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if !matches!(field.name(), Some("files" | "files[]")) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .filter(|m| !m.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file {}: {}", name, e)))?;

        if data.len() > MAX_SKILL_FILE_BYTES {
            return Err(ApiError::bad_request(format!(
                "File {} exceeds 8MB limit",
                name
            )));
        }

        files.push(UploadFile::new(name, mime_type, data.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    if !files.iter().any(|f| f.file_name() == SKILL_FILE) {
        return Err(ApiError::bad_request("SKILL.md file is required"));
    }

    Ok(files)
}

async fn create_skill_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let files = read_skill_files(multipart).await?;

    let skill = state
        .provider
        .create_skill(None, &files)
        .await
        .map_err(|e| ApiError::upstream("Failed to create skill", &e))?;

    info!("Created skill {} from {} files", skill.id, files.len());
    Ok(Json(json!({ "success": true, "data": skill })))
}

async fn create_skill_version_handler(
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let files = read_skill_files(multipart).await?;

    let version = state
        .provider
        .create_skill_version(&skill_id, &files)
        .await
        .map_err(|e| ApiError::upstream("Failed to create skill version", &e))?;

    info!(
        "Created version {} of skill {} from {} files",
        version["version"], skill_id, files.len()
    );
    Ok(Json(json!({
        "success": true,
        "data": {
            "id": version["id"],
            "skill_id": version["skill_id"],
            "version": version["version"],
            "created_at": version["created_at"],
        },
    })))
}

async fn get_skill_handler(
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let skill = state
        .provider
        .get_skill(&skill_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to retrieve skill", &e))?;
    Ok(Json(json!({ "success": true, "data": skill })))
}

async fn delete_skill_handler(
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .delete_skill(&skill_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to delete skill", &e))?;
    Ok(Json(
        json!({ "success": true, "message": "Skill deleted successfully" }),
    ))
}

async fn list_skill_versions_handler(
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let versions = state
        .provider
        .list_skill_versions(&skill_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to list skill versions", &e))?;
    Ok(Json(json!({
        "success": true,
        "count": versions.len(),
        "data": versions,
    })))
}

async fn delete_skill_version_handler(
    State(state): State<Arc<AppState>>,
    Path((skill_id, version)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .delete_skill_version(&skill_id, &version)
        .await
        .map_err(|e| ApiError::upstream("Failed to delete skill version", &e))?;
    Ok(Json(
        json!({ "success": true, "message": "Skill version deleted successfully" }),
    ))
}

async fn load_bundles(state: &AppState) -> ApiResult<Vec<skillgate_skills::SkillBundle>> {
    let dir = state.skills_dir.clone();
    tokio::task::spawn_blocking(move || discover_bundles(&dir))
        .await
        .map_err(|e| {
            error!("Skill discovery task failed: {}", e);
            ApiError::internal("An error occurred listing skills")
        })?
        .map_err(|e| {
            error!("Error scanning skills directory: {:#}", e);
            ApiError::internal("An error occurred listing skills")
        })
}

async fn list_bundles_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let bundles = load_bundles(&state).await?;
    let skills: Vec<Value> = bundles
        .iter()
        .map(|b| {
            json!({
                "name": b.name(),
                "description": b.description(),
                "directory": b.directory,
                "fileCount": b.file_count(),
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "skills": skills })))
}

async fn upload_bundles_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let bundles = load_bundles(&state).await?;

    if bundles.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "message": "No skills found in directory",
            "skills": [],
        })));
    }

    let mut uploaded = Vec::new();
    for bundle in &bundles {
        info!("Uploading skill: {}", bundle.name());

        // the provider expects every file under one top-level folder
        let files: Vec<UploadFile> = bundle
            .files
            .iter()
            .map(|f| {
                UploadFile::new(
                    format!("{}/{}", bundle.directory, f.path),
                    f.mime_type.clone(),
                    f.content.clone(),
                )
            })
            .collect();

        match state
            .provider
            .create_skill(Some(bundle.name()), &files)
            .await
        {
            Ok(skill) => {
                info!(
                    "Successfully uploaded skill: {} (ID: {})",
                    bundle.name(),
                    skill.id
                );
                uploaded.push(json!({
                    "name": bundle.name(),
                    "description": bundle.description(),
                    "skillId": skill.id,
                    "version": skill.latest_version,
                    "directory": bundle.directory,
                }));
            }
            Err(e) => {
                error!("Error uploading skill {}: {}", bundle.name(), e);
                return Err(ApiError::internal(format!(
                    "Failed to upload skill '{}': {}",
                    bundle.name(),
                    e
                )));
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Successfully uploaded {} skills", uploaded.len()),
        "skills": uploaded,
    })))
}

// ── Files ──────────────────────────────────────────────────────

async fn list_files_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let files = state
        .provider
        .list_files()
        .await
        .map_err(|e| ApiError::upstream("Failed to list files", &e))?;
    Ok(Json(json!({
        "success": true,
        "count": files.len(),
        "data": files,
    })))
}

async fn get_file_handler(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let file = state
        .provider
        .get_file(&file_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to retrieve file", &e))?;
    Ok(Json(json!({ "success": true, "data": file })))
}

async fn delete_file_handler(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .delete_file(&file_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to delete file", &e))?;
    Ok(Json(
        json!({ "success": true, "message": "File deleted successfully" }),
    ))
}

async fn download_file_handler(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> ApiResult<Response> {
    let metadata = state
        .provider
        .get_file(&file_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to download file", &e))?;
    let content = state
        .provider
        .download_file(&file_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to download file", &e))?;

    let content_type = HeaderValue::from_str(metadata.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&metadata.download_name(), &file_id),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to download file")
        })
}

/// `attachment; filename="..."`, falling back to `file-{id}` for names that
/// cannot be sent in a header
fn content_disposition(filename: &str, file_id: &str) -> HeaderValue {
    let cleaned: String = filename.chars().filter(|c| *c != '"').collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", cleaned))
        .or_else(|_| HeaderValue::from_str(&format!("attachment; filename=\"file-{}\"", file_id)))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
