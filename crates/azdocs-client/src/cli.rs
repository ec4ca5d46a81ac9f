use std::path::PathBuf;

use azdocs_shared::types::{AccessLevel, ConversationId};
use clap::{Parser, Subcommand};

use crate::routing::Route;

/// Terminal client for the AzDocs documentation assistant.
#[derive(Debug, Parser)]
#[command(name = "azdocs", version, about)]
pub struct Cli {
    /// Backend origin (overrides AZDOCS_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for the session database (overrides AZDOCS_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the URL to open in a browser to sign in.
    Login,
    /// Finish signing in with the URL (or query string) the browser was
    /// redirected to.
    Callback {
        /// Callback URL, `?token=...` query, or the bare token.
        input: String,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in identity.
    Whoami,
    /// List conversations.
    Chats,
    /// Start a new conversation.
    New {
        #[arg(long)]
        title: Option<String>,
    },
    /// Print a conversation's history.
    History { chat_id: String },
    /// Ask one question in a conversation.
    Ask {
        chat_id: String,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Interactive chat. Starts a new conversation unless an id is given.
    Chat { chat_id: Option<String> },
    /// Upload PDF documents.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Access level 1-5 (Public, Internal, Confidential, Restricted,
        /// Top Secret).
        #[arg(long, short, default_value = "1", value_parser = parse_access_level)]
        level: AccessLevel,
    },
}

impl Command {
    /// The view this command stands for, used by the route guard.
    pub fn route(&self) -> Route {
        match self {
            Command::Login | Command::Logout | Command::Whoami => Route::Login,
            Command::Callback { .. } => Route::AuthCallback,
            Command::Chats | Command::New { .. } | Command::Chat { chat_id: None } => {
                Route::Chat(None)
            }
            Command::History { chat_id }
            | Command::Ask { chat_id, .. }
            | Command::Chat {
                chat_id: Some(chat_id),
            } => Route::Chat(Some(ConversationId::new(chat_id.as_str()))),
            Command::Upload { .. } => Route::Upload,
        }
    }
}

fn parse_access_level(s: &str) -> Result<AccessLevel, String> {
    s.parse().map_err(|e| format!("{e}"))
}
