use azdocs_shared::types::ConversationId;

use crate::render;
use crate::state::AppState;
use crate::views::{ChatView, ConversationList};

pub async fn list(state: &AppState) -> anyhow::Result<()> {
    let mut sidebar = ConversationList::new();
    sidebar.refresh(&state.api).await;
    println!("{}", render::conversation_list(sidebar.conversations(), None));
    Ok(())
}

pub async fn create(state: &AppState, title: Option<&str>) -> anyhow::Result<()> {
    let mut sidebar = ConversationList::new();
    let conversation = sidebar.create(&state.api, title).await;
    println!("{}  {}", conversation.id, conversation.title);
    Ok(())
}

pub async fn history(state: &AppState, chat_id: ConversationId) -> anyhow::Result<()> {
    let mut view = ChatView::new();
    view.open(&state.api, chat_id).await;
    println!("{}", render::transcript(view.entries()));
    Ok(())
}
