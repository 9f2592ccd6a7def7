use anyhow::Result;
use console::style;
use voicecards_core::view::{CardDraft, StatusCounts, StatusFilter, filter_cards};
use voicecards_core::{AppContext, CardPatch, CardStatus, ServiceResponse};

use crate::app::{self, print_card, print_card_line, require_session};
use crate::interactive;

/// Print the error and exit, or hand back the data
fn unwrap_response<T>(response: ServiceResponse<T>) -> T {
    match response.into_result() {
        Ok(data) => data,
        Err(message) => {
            interactive::error(&message);
            std::process::exit(1);
        }
    }
}

pub async fn list(ctx: &mut AppContext, filter: StatusFilter, json: bool) -> Result<()> {
    require_session(ctx).await?;
    unwrap_response(ctx.cards.refresh().await);

    let cards = ctx.cards.cards();
    let shown = filter_cards(cards, filter);
    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let counts = StatusCounts::from_cards(cards);
    println!(
        "{} total  {} {}  {} {}  {} {}",
        counts.total,
        app::styled_status(CardStatus::Undone),
        counts.undone,
        app::styled_status(CardStatus::Doing),
        counts.doing,
        app::styled_status(CardStatus::Done),
        counts.done
    );
    println!();

    if shown.is_empty() {
        println!("{}", style("No cards yet. Create one with: voicecards create").dim());
    }
    for card in shown {
        print_card_line(card);
    }
    Ok(())
}

pub async fn show(ctx: &mut AppContext, id: &str, json: bool) -> Result<()> {
    require_session(ctx).await?;
    let card = unwrap_response(ctx.cards.service().get_card(id).await);
    if json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        print_card(&card);
    }
    Ok(())
}

fn pick_status(current: CardStatus) -> Result<CardStatus> {
    let statuses = CardStatus::all();
    let labels: Vec<&str> = statuses.iter().map(CardStatus::label).collect();
    let default = statuses.iter().position(|s| *s == current);
    let idx = interactive::select("Status", &labels, default)?;
    Ok(statuses[idx])
}

/// Prompt until the form validates
fn fill_draft(mut draft: CardDraft) -> Result<CardDraft> {
    loop {
        draft.title = interactive::input("Title", Some(&draft.title))?;
        draft.content = interactive::input("Content", Some(&draft.content))?;
        draft.status = pick_status(draft.status)?;
        match draft.validate() {
            Ok(()) => return Ok(draft),
            Err(message) => interactive::error(&message),
        }
    }
}

pub async fn create(
    ctx: &mut AppContext,
    title: Option<String>,
    content: Option<String>,
    status: Option<CardStatus>,
) -> Result<()> {
    require_session(ctx).await?;

    let draft = match (title, content) {
        (Some(title), Some(content)) => CardDraft::new(title, content, status.unwrap_or_default()),
        (title, content) => {
            interactive::header("New card");
            fill_draft(CardDraft::new(
                title.unwrap_or_default(),
                content.unwrap_or_default(),
                status.unwrap_or_default(),
            ))?
        }
    };

    let card = match draft.into_simple() {
        Ok(card) => card,
        Err(message) => {
            interactive::error(&message);
            std::process::exit(1);
        }
    };
    let created = unwrap_response(ctx.cards.add(card).await);
    interactive::success(&format!("Created card {}", style(&created.id).dim()));
    Ok(())
}

pub async fn edit(
    ctx: &mut AppContext,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    status: Option<CardStatus>,
) -> Result<()> {
    require_session(ctx).await?;
    let original = unwrap_response(ctx.cards.service().get_card(id).await);

    let patch = if title.is_none() && content.is_none() && status.is_none() {
        interactive::header("Edit card");
        let draft = fill_draft(CardDraft::from_card(&original))?;
        match draft.into_patch(&original) {
            Ok(patch) => patch,
            Err(message) => {
                interactive::error(&message);
                std::process::exit(1);
            }
        }
    } else {
        CardPatch {
            title,
            content,
            status,
        }
    };

    if patch.is_empty() {
        interactive::info("Nothing changed");
        return Ok(());
    }
    let updated = unwrap_response(ctx.cards.update(id, patch).await);
    interactive::success(&format!("Updated \"{}\"", updated.title));
    Ok(())
}

pub async fn delete(ctx: &mut AppContext, id: &str, yes: bool) -> Result<()> {
    require_session(ctx).await?;
    if !yes && !interactive::confirm(&format!("Delete card {id}?"), false)? {
        return Ok(());
    }
    unwrap_response(ctx.cards.remove(id).await);
    interactive::success("Card deleted");
    Ok(())
}
