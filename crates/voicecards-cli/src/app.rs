use anyhow::{Context, Result};
use console::style;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::Write;
use std::sync::Arc;
use voicecards_core::{AppContext, Card, CardStatus, FileCredentialStore, Settings};

/// Settings, token store and services for this invocation
pub fn build_context(mock: bool) -> Result<AppContext> {
    let settings = Settings::load();
    settings.validate()?;
    let credentials = Arc::new(FileCredentialStore::new(Settings::token_path()));

    let ctx = if mock {
        AppContext::mock(settings, credentials)
    } else {
        AppContext::connect(settings, credentials)
    };
    ctx.context("Failed to set up services")
}

/// Card commands need a live session unless running against the mock backend
pub async fn require_session(ctx: &mut AppContext) -> Result<()> {
    if ctx.is_mock() {
        return Ok(());
    }
    let restored = ctx.session.restore().await;
    if restored.success {
        return Ok(());
    }
    eprintln!("Error: {}.", restored.error_message());
    eprintln!("\nLog in with:");
    eprintln!("  voicecards login\n");
    eprintln!("Or try the demo backend with --mock.");
    std::process::exit(1);
}

pub fn wait_for_enter() -> Result<()> {
    std::io::stdout().flush()?;

    enable_raw_mode()?;
    let result = read_until_enter();
    disable_raw_mode()?;

    result
}

fn read_until_enter() -> Result<()> {
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press && key_event.code == KeyCode::Enter {
                return Ok(());
            }
        }
    }
}

pub fn styled_status(status: CardStatus) -> String {
    let label = status.label();
    match status {
        CardStatus::Done => style(label).green().to_string(),
        CardStatus::Doing => style(label).yellow().to_string(),
        CardStatus::Undone => style(label).dim().to_string(),
    }
}

/// One line per card for listings
pub fn print_card_line(card: &Card) {
    println!(
        "{}  {:<8} {}",
        style(&card.id).dim(),
        styled_status(card.status),
        style(&card.title).bold()
    );
}

pub fn print_card(card: &Card) {
    println!("{}", style(&card.title).bold().cyan());
    println!("{}", card.content);
    println!();
    println!("  {:<8} {}", style("id").dim(), card.id);
    println!("  {:<8} {}", style("status").dim(), styled_status(card.status));
    println!(
        "  {:<8} {}",
        style("created").dim(),
        card.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  {:<8} {}",
        style("updated").dim(),
        card.updated_at.format("%Y-%m-%d %H:%M")
    );
}
