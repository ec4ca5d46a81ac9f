//! HTTP client for the assistant backend.
//!
//! Every call is a single request against the configured origin with the
//! bearer token attached when one is present. There are no retries and no
//! timeouts; each operation either returns the decoded body or an
//! [`ApiError`] and the caller picks the fallback.

use std::path::Path;

use azdocs_shared::constants::{
    FIELD_ACCESS_LEVEL, FIELD_FILE, FIELD_FILE_NAME, PATH_CHAT, PATH_CHATS, PATH_LOGIN,
    PATH_NEW_CHAT, PATH_UPLOAD_PDF,
};
use azdocs_shared::protocol::{
    ChatReply, ChatRequest, ErrorBody, HistoryResponse, NewConversationRequest, UploadResponse,
};
use azdocs_shared::types::{AccessLevel, Conversation, ConversationId, Message};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, Result};

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL the user opens to sign in. The backend redirects to the identity
    /// provider, which eventually lands on the auth callback with a token.
    pub fn login_url(&self) -> Result<Url> {
        self.endpoint(PATH_LOGIN, &[])
    }

    /// `POST /api/chat`
    pub async fn send_message(&self, chat_id: &ConversationId, message: &str) -> Result<ChatReply> {
        let url = self.endpoint(PATH_CHAT, &[])?;
        let body = ChatRequest {
            chat_id: chat_id.clone(),
            message: message.to_string(),
        };

        debug!(chat_id = %chat_id, len = message.len(), "sending chat message");
        let response = self.send(self.authorized(self.http.post(url)).json(&body)).await?;
        read_json(response).await
    }

    /// `GET /api/chats/{chatId}`, numbered from 1 in the order received.
    ///
    /// A conversation the backend has never seen answers 404; that is the
    /// normal state of a freshly created conversation and maps to an empty
    /// history.
    pub async fn get_chat_history(&self, chat_id: &ConversationId) -> Result<Vec<Message>> {
        let url = self.endpoint(PATH_CHATS, &[chat_id.as_str()])?;

        let response = self.send(self.authorized(self.http.get(url))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(chat_id = %chat_id, "no history on the backend yet");
            return Ok(Vec::new());
        }

        let history: HistoryResponse = read_json(response).await?;
        debug!(chat_id = %chat_id, count = history.messages.len(), "history loaded");
        Ok(history.into_messages(1))
    }

    /// `GET /api/chats`
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let url = self.endpoint(PATH_CHATS, &[])?;
        let response = self.send(self.authorized(self.http.get(url))).await?;
        read_json(response).await
    }

    /// `POST /api/chats/new`
    pub async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        let url = self.endpoint(PATH_NEW_CHAT, &[])?;
        let body = NewConversationRequest {
            title: title.to_string(),
        };
        let response = self.send(self.authorized(self.http.post(url)).json(&body)).await?;
        read_json(response).await
    }

    /// `POST /api/upload/pdf` as multipart `file`, `accessLevel`, `fileName`.
    pub async fn upload_document(
        &self,
        path: &Path,
        file_name: &str,
        access_level: AccessLevel,
    ) -> Result<UploadResponse> {
        let url = self.endpoint(PATH_UPLOAD_PDF, &[])?;

        let data = tokio::fs::read(path).await.map_err(|e| ApiError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size = data.len();

        let part = file_part(data, file_name, PDF_MIME)?;
        let form = Form::new()
            .part(FIELD_FILE, part)
            .text(FIELD_ACCESS_LEVEL, access_level.value().to_string())
            .text(FIELD_FILE_NAME, file_name.to_string());

        debug!(file = %file_name, size, level = access_level.value(), "uploading document");
        let response = self
            .send(self.authorized(self.http.post(url)).multipart(form))
            .await?;

        // The backend has answered both `{blobUrl}` and `{error}` with a
        // success status; only a blob URL counts as success.
        let status = response.status().as_u16();
        let body: serde_json::Value = read_json(response).await?;
        if let Ok(uploaded) = serde_json::from_value::<UploadResponse>(body.clone()) {
            return Ok(uploaded);
        }
        let message = serde_json::from_value::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| "Upload response carried no blobUrl".to_string());
        Err(ApiError::RequestFailed { status, message })
    }

    /// Join `path` and extra segments onto the base URL. Segments are
    /// percent-encoded, so ids can never escape their path position.
    fn endpoint(&self, path: &str, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            segments.extend(extra);
        }
        url.set_query(None);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(ApiError::Network)
    }
}

/// Decode a JSON body, turning non-success statuses into
/// [`ApiError::RequestFailed`] with the server's message when it sent one.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ApiError::Network)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        return Err(ApiError::RequestFailed {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// Multipart file part. A bad MIME type fails before anything is sent.
fn file_part(data: Vec<u8>, file_name: &str, mime: &str) -> Result<Part> {
    Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .map_err(|e| ApiError::InvalidRequest(format!("bad content type {mime:?}: {e}")))
}
