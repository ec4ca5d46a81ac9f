use std::io::Write;

use azdocs_shared::types::ConversationId;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;
use crate::state::AppState;
use crate::views::{ChatView, ConversationList};

/// One line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Help,
    List,
    New,
    Switch(ConversationId),
    Message(String),
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "exit" | "q"), None) => Input::Quit,
        (Some("help" | "?"), None) => Input::Help,
        (Some("list" | "chats"), None) => Input::List,
        (Some("new"), None) => Input::New,
        (Some("switch"), Some(id)) => Input::Switch(id.into()),
        _ => Input::Unknown(line.to_string()),
    }
}

const HELP: &str = "\
Type a question and press Enter.
  /new           start a new conversation
  /switch <id>   open another conversation
  /list          list conversations
  /quit          leave";

/// Send one message and print the exchange.
pub async fn ask(state: &AppState, chat_id: ConversationId, message: &str) -> anyhow::Result<()> {
    let mut view = ChatView::new();
    view.open(&state.api, chat_id).await;

    let before = view.entries().len();
    if !view.send(&state.api, message).await {
        anyhow::bail!("Nothing to send.");
    }
    println!("{}", render::transcript(&view.entries()[before..]));
    Ok(())
}

pub async fn interactive(state: &AppState, chat_id: Option<ConversationId>) -> anyhow::Result<()> {
    let api = &state.api;
    let mut sidebar = ConversationList::new();
    sidebar.refresh(api).await;

    let chat_id = match chat_id {
        Some(id) => id,
        None => sidebar.create(api, None).await.id,
    };
    sidebar.select(chat_id.clone());

    let mut view = ChatView::new();
    view.open(api, chat_id.clone()).await;
    print_opened(&sidebar, &view, &chat_id);
    println!("(/help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::List => println!(
                "{}",
                render::conversation_list(sidebar.conversations(), sidebar.active())
            ),
            Input::New => {
                let conversation = sidebar.create(api, None).await;
                view.open(api, conversation.id.clone()).await;
                print_opened(&sidebar, &view, &conversation.id);
            }
            Input::Switch(id) => {
                if !sidebar.select(id.clone()) {
                    println!("(conversation {id} is not in the list, opening it anyway)");
                }
                view.open(api, id.clone()).await;
                print_opened(&sidebar, &view, &id);
            }
            Input::Message(text) => {
                let before = view.entries().len();
                if view.send(api, &text).await {
                    // Skip the echo of what was just typed.
                    for entry in view.entries().iter().skip(before + 1) {
                        println!("{}\n", render::transcript_entry(entry));
                    }
                }
            }
            Input::Unknown(line) => println!("Unknown command: {line} (/help for commands)"),
        }
    }

    Ok(())
}

fn print_opened(sidebar: &ConversationList, view: &ChatView, id: &ConversationId) {
    let title = sidebar.get(id).map(|c| c.title.as_str()).unwrap_or("");
    println!("== {id} {title}");
    println!("{}\n", render::transcript(view.entries()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_input() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/new"), Input::New);
        assert_eq!(parse_input("/switch 17.5"), Input::Switch("17.5".into()));
        assert_eq!(parse_input("/switch"), Input::Unknown("/switch".into()));
        assert_eq!(
            parse_input(" What is Azure? "),
            Input::Message("What is Azure?".into())
        );
    }
}
