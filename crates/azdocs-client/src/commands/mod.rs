//! Command handlers behind the `azdocs` binary.
//!
//! Every command is first resolved through the route guard; protected
//! commands refuse to run without a stored session.

mod auth;
mod chat;
mod chats;
mod upload;

use anyhow::bail;

use crate::cli::Command;
use crate::state::AppState;

pub async fn dispatch(state: &mut AppState, command: Command) -> anyhow::Result<()> {
    let requested = command.route();
    let resolved = state.resolve(requested.clone());
    if resolved != requested {
        bail!(
            "Not signed in. Run `azdocs login`, sign in through the browser, \
             then `azdocs callback <redirect-url>`."
        );
    }

    match command {
        Command::Login => auth::login(state),
        Command::Callback { input } => auth::callback(state, &input),
        Command::Logout => auth::logout(state),
        Command::Whoami => auth::whoami(state),
        Command::Chats => chats::list(state).await,
        Command::New { title } => chats::create(state, title.as_deref()).await,
        Command::History { chat_id } => chats::history(state, chat_id.into()).await,
        Command::Ask { chat_id, message } => chat::ask(state, chat_id.into(), &message.join(" ")).await,
        Command::Chat { chat_id } => chat::interactive(state, chat_id.map(Into::into)).await,
        Command::Upload { files, level } => upload::upload(state, &files, level).await,
    }
}
