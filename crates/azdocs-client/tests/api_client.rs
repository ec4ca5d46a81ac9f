mod common;

use azdocs_client::ApiError;
use azdocs_shared::types::{AccessLevel, ConversationId, Sender};
use common::{unreachable_url, Backend};
use tempfile::TempDir;

#[tokio::test]
async fn unknown_conversation_has_empty_history() {
    let backend = Backend::start().await;
    let api = backend.client();

    for id in ["1712345678901", "1712345.123456", "never-created"] {
        let history = api.get_chat_history(&ConversationId::new(id)).await.unwrap();
        assert!(history.is_empty(), "{id}");
    }
}

#[tokio::test]
async fn conversation_lifecycle() {
    let backend = Backend::start().await;
    let api = backend.client();

    let created = api.create_conversation("Storage questions").await.unwrap();
    assert_eq!(created.title, "Storage questions");
    assert!(api.get_chat_history(&created.id).await.unwrap().is_empty());

    let reply = api
        .send_message(&created.id, "How do I create a storage account?")
        .await
        .unwrap();
    assert!(!reply.text.is_empty());

    let history = api.get_chat_history(&created.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].text, "How do I create a storage account?");
    assert_eq!(history[1].sender, Sender::Bot);
    assert_eq!(history.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);

    let listed = api.list_conversations().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[tokio::test]
async fn replies_cite_uploaded_documents() {
    let backend = Backend::start().await;
    let api = backend.client();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("azure-networking-guide.pdf");
    std::fs::write(&path, b"%PDF-1.7 networking").unwrap();

    let uploaded = api
        .upload_document(&path, "azure-networking-guide.pdf", AccessLevel::INTERNAL)
        .await
        .unwrap();
    assert!(uploaded.blob_url.contains("/blobs/"));

    let blob_request = reqwest::Client::new().get(&uploaded.blob_url);
    assert_eq!(blob_request.try_clone().unwrap().send().await.unwrap().status(), 401);

    let blob = blob_request
        .bearer_auth(backend.state.dev_token())
        .send()
        .await
        .unwrap();
    assert_eq!(blob.status(), 200);
    assert_eq!(&blob.bytes().await.unwrap()[..], b"%PDF-1.7 networking");

    let reply = api
        .send_message(&ConversationId::mint(), "Where is the networking guide?")
        .await
        .unwrap();
    assert_eq!(reply.references.len(), 1);
    assert_eq!(reply.references[0].title, "azure-networking-guide.pdf");
}

#[tokio::test]
async fn missing_token_is_request_failure() {
    let backend = Backend::start().await;
    let err = backend.anonymous_client().list_conversations().await.unwrap_err();

    match err {
        ApiError::RequestFailed { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let api = azdocs_client::ApiClient::new(unreachable_url().await);
    assert!(matches!(
        api.list_conversations().await,
        Err(ApiError::Network(_))
    ));
}

#[tokio::test]
async fn missing_upload_file_is_io_error() {
    let backend = Backend::start().await;
    let result = backend
        .client()
        .upload_document(std::path::Path::new("/nonexistent/x.pdf"), "x.pdf", AccessLevel::PUBLIC)
        .await;
    assert!(matches!(result, Err(ApiError::Io { .. })));
}
