use anyhow::Result;
use voicecards_core::{AppContext, Settings};

use crate::interactive;

pub async fn login(ctx: &mut AppContext, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => interactive::input("Email", None)?,
    };
    let password = interactive::password("Password")?;

    let response = ctx.session.login(&email, &password).await;
    match response.into_result() {
        Ok(user) => {
            interactive::success(&format!("Logged in as {} <{}>", user.name, user.email));
            Ok(())
        }
        Err(message) => {
            interactive::error(&message);
            std::process::exit(1);
        }
    }
}

pub async fn register(
    ctx: &mut AppContext,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    interactive::header("Create your VoiceCards account");
    let name = match name {
        Some(name) => name,
        None => interactive::input("Name", None)?,
    };
    let email = match email {
        Some(email) => email,
        None => interactive::input("Email", None)?,
    };
    let password = interactive::password("Password")?;

    let response = ctx.session.register(&name, &email, &password).await;
    match response.into_result() {
        Ok(user) => {
            interactive::success(&format!("Welcome, {}! You are logged in.", user.name));
            Ok(())
        }
        Err(message) => {
            interactive::error(&message);
            std::process::exit(1);
        }
    }
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    let response = ctx.session.logout();
    if response.success {
        interactive::success("Logged out");
        Ok(())
    } else {
        anyhow::bail!("{}", response.error_message())
    }
}

pub async fn whoami(ctx: &mut AppContext) -> Result<()> {
    match ctx.session.restore().await.into_result() {
        Ok(user) => {
            interactive::success(&format!("Logged in as {} <{}>", user.name, user.email));
            interactive::info(&format!("Backend: {}", ctx.settings.api_url));
            voicecards_core::verbose!("Token stored at {}", Settings::token_path().display());
        }
        Err(message) => {
            interactive::info(&format!("{message}. Run: voicecards login"));
        }
    }
    Ok(())
}
