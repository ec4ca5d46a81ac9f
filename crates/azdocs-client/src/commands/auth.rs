use anyhow::bail;

use crate::render;
use crate::routing::Route;
use crate::state::AppState;

pub fn login(state: &AppState) -> anyhow::Result<()> {
    if state.session.is_authenticated() {
        println!("Already signed in. Run `azdocs logout` first to switch accounts.");
        return Ok(());
    }

    let url = state.api.login_url()?;
    println!("Open this URL in a browser to sign in:\n\n  {url}\n");
    println!("Then run `azdocs callback <url>` with the address you were redirected to.");
    Ok(())
}

pub fn callback(state: &mut AppState, input: &str) -> anyhow::Result<()> {
    match state.callback(input)? {
        Route::Chat(_) => {
            let name = state
                .session
                .claims()
                .and_then(|c| c.display_name())
                .unwrap_or("(unknown user)");
            println!("Signed in as {name}.");
            Ok(())
        }
        _ => bail!("The callback did not contain a usable token; nothing was saved."),
    }
}

pub fn logout(state: &mut AppState) -> anyhow::Result<()> {
    state.logout()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(state: &AppState) -> anyhow::Result<()> {
    match state.session.claims() {
        Some(claims) => println!("{}", render::identity(claims)),
        None => println!("Not signed in."),
    }
    Ok(())
}
