use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use azdocs_shared::constants::{
    DEFAULT_CHAT_TITLE, FIELD_ACCESS_LEVEL, FIELD_FILE, FIELD_FILE_NAME, TOKEN_QUERY_PARAM,
};
use azdocs_shared::protocol::{
    ChatReply, ChatRequest, HistoryResponse, NewConversationRequest, UploadResponse,
};
use azdocs_shared::types::{AccessLevel, Conversation, ConversationId};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assistant;
use crate::auth::TokenIssuer;
use crate::config::ServerConfig;
use crate::conversations::ConversationStore;
use crate::error::ServerError;
use crate::uploads::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub conversations: Arc<ConversationStore>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let uploads =
            UploadStore::new(config.upload_storage_path.clone(), config.max_upload_size).await?;
        let tokens = TokenIssuer::new(&config.token_secret, config.token_ttl_secs);

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            conversations: Arc::new(ConversationStore::new()),
            uploads: Arc::new(uploads),
        })
    }

    /// Mint a token for the configured dev user.
    pub fn dev_token(&self) -> String {
        self.tokens.issue(
            &self.config.dev_user_id,
            &self.config.dev_user_name,
            &self.config.dev_user_email,
            self.config.dev_user_clearance,
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    // Multipart framing needs headroom above the file itself.
    let body_limit = state.config.max_upload_size + 64 * 1024;

    Router::new()
        .route("/health", get(health_check))
        .route("/login", get(login))
        .route("/api/chat", post(chat))
        .route("/api/chats", get(list_chats))
        .route("/api/chats/new", post(new_chat))
        .route("/api/chats/:chat_id", get(get_chat))
        .route("/api/upload/pdf", post(upload_pdf))
        .route("/blobs/:name", get(get_blob))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn login(State(state): State<AppState>) -> Redirect {
    let token = state.dev_token();
    let callback = &state.config.frontend_callback_url;
    let separator = if callback.contains('?') { '&' } else { '?' };

    info!(user = %state.config.dev_user_id, "Issued dev login token");
    Redirect::to(&format!("{callback}{separator}{TOKEN_QUERY_PARAM}={token}"))
}

async fn list_chats(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Vec<Conversation>>, ServerError> {
    let user = state.tokens.authenticate(&headers)?;
    Ok(Json(state.conversations.list(&user.user_id).await))
}

async fn get_chat(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let user = state.tokens.authenticate(&headers)?;
    let chat_id = ConversationId::new(chat_id);

    state
        .conversations
        .history(&user.user_id, &chat_id)
        .await
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("Chat not found".to_string()))
}

async fn new_chat(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Option<Json<NewConversationRequest>>,
) -> Result<Json<Conversation>, ServerError> {
    let user = state.tokens.authenticate(&headers)?;

    let title = body
        .map(|Json(req)| req.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());

    Ok(Json(state.conversations.create(&user.user_id, &title).await))
}

async fn chat(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ServerError> {
    let user = state.tokens.authenticate(&headers)?;

    let question = req.message.trim();
    if question.is_empty() {
        return Err(ServerError::BadRequest("No message provided".to_string()));
    }
    if req.chat_id.as_str().is_empty() {
        return Err(ServerError::BadRequest("No chat_id provided".to_string()));
    }

    let documents = state.uploads.list_visible(&user).await;
    let mut reply = assistant::answer(question, &documents);

    state
        .conversations
        .record_exchange(&user.user_id, &req.chat_id, question, &reply)
        .await;

    info!(
        user = %user.user_id,
        chat_id = %req.chat_id,
        references = reply.references.len(),
        "Answered chat message"
    );

    reply.chat_id = Some(req.chat_id);
    Ok(Json(reply))
}

async fn upload_pdf(
    headers: HeaderMap,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let user = state.tokens.authenticate(&headers)?;

    let mut data = None;
    let mut part_file_name = None;
    let mut file_name = None;
    let mut access_level = AccessLevel::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            FIELD_FILE => {
                part_file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ServerError::BadRequest(format!("Failed to read field: {}", e))
                })?;
                data = Some(bytes);
            }
            FIELD_ACCESS_LEVEL => {
                let text = field.text().await.map_err(|e| {
                    ServerError::BadRequest(format!("Failed to read field: {}", e))
                })?;
                access_level = text
                    .parse()
                    .map_err(|_| ServerError::BadRequest(format!("Invalid access level: {text}")))?;
            }
            FIELD_FILE_NAME => {
                let text = field.text().await.map_err(|e| {
                    ServerError::BadRequest(format!("Failed to read field: {}", e))
                })?;
                file_name = Some(text);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| {
        ServerError::BadRequest("Missing 'file' field in multipart form".to_string())
    })?;
    let file_name = file_name
        .or(part_file_name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "document.pdf".to_string());

    let document = state
        .uploads
        .store_pdf(&user.user_id, &file_name, access_level, &data)
        .await?;

    let blob_url = format!("{}/blobs/{}", public_origin(&state, &headers), document.stored_name);

    info!(
        user = %user.user_id,
        file = %file_name,
        level = access_level.value(),
        size = document.size,
        "Document uploaded"
    );

    Ok(Json(UploadResponse { blob_url }))
}

async fn get_blob(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ServerError> {
    let user = state.tokens.authenticate(&headers)?;
    let data = state.uploads.read_for(&user, &name).await?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], data).into_response())
}

fn public_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.config.public_url {
        return url.clone();
    }
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_else(|| format!("http://{}", state.config.http_addr))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(state, listener).await
}

/// Serve on an already bound listener (e.g. `127.0.0.1:0` in tests).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;
    Ok(())
}
