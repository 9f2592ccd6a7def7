//! Interactive prompt helpers using dialoguer
//!
//! Themed, consistent prompts for the card forms and the recording review.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select, theme::ColorfulTheme};

pub fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Select from a list of options with arrow keys
pub fn select<T: std::fmt::Display>(
    prompt: &str,
    items: &[T],
    default: Option<usize>,
) -> Result<usize> {
    let theme = theme();
    let mut select = Select::with_theme(&theme).with_prompt(prompt).items(items);

    if let Some(idx) = default {
        select = select.default(idx);
    }

    Ok(select.interact()?)
}

/// Pick any number of items; `checked` is the initial state per item
pub fn multi_select<T: std::fmt::Display>(
    prompt: &str,
    items: &[T],
    checked: &[bool],
) -> Result<Vec<usize>> {
    let theme = theme();
    Ok(MultiSelect::with_theme(&theme)
        .with_prompt(prompt)
        .items(items)
        .defaults(checked)
        .interact()?)
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let theme = theme();
    Ok(Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Get text input; `initial` is pre-filled and editable
pub fn input(prompt: &str, initial: Option<&str>) -> Result<String> {
    let theme = theme();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty(true);

    if let Some(text) = initial {
        input = input.with_initial_text(text);
    }

    Ok(input.interact_text()?)
}

pub fn password(prompt: &str) -> Result<String> {
    let theme = theme();
    Ok(Password::with_theme(&theme).with_prompt(prompt).interact()?)
}

pub fn header(text: &str) {
    println!();
    println!("{}", style(text).bold().cyan());
    println!();
}

pub fn success(text: &str) {
    println!("{} {}", style("✓").green().bold(), text);
}

pub fn error(text: &str) {
    eprintln!("{} {}", style("✗").red().bold(), text);
}

pub fn info(text: &str) {
    println!("{} {}", style("ℹ").blue(), text);
}
