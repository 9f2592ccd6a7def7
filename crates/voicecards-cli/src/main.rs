mod app;
mod args;
mod commands;
mod interactive;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    voicecards_core::set_verbose(cli.verbose);

    let mut ctx = match &cli.command {
        Command::Config(args) => return commands::config::run(args),
        _ => app::build_context(cli.mock)?,
    };

    match cli.command {
        Command::Login { email } => commands::auth::login(&mut ctx, email).await,
        Command::Register { name, email } => commands::auth::register(&mut ctx, name, email).await,
        Command::Logout => commands::auth::logout(&mut ctx),
        Command::Whoami => commands::auth::whoami(&mut ctx).await,
        Command::List { status, json } => commands::cards::list(&mut ctx, status, json).await,
        Command::Show { id, json } => commands::cards::show(&mut ctx, &id, json).await,
        Command::Create {
            title,
            content,
            status,
        } => commands::cards::create(&mut ctx, title, content, status).await,
        Command::Edit {
            id,
            title,
            content,
            status,
        } => commands::cards::edit(&mut ctx, &id, title, content, status).await,
        Command::Delete { id, yes } => commands::cards::delete(&mut ctx, &id, yes).await,
        Command::Record { file } => commands::record::run(&mut ctx, file).await,
        Command::Config(_) => Ok(()),
    }
}
