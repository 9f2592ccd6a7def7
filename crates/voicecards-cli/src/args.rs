use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use voicecards_core::CardStatus;
use voicecards_core::view::StatusFilter;

#[derive(Parser)]
#[command(
    name = "voicecards",
    about = "Manage cards and turn voice notes into cards",
    version
)]
pub struct Cli {
    /// Use the in-memory demo backend and a canned transcript
    #[arg(long, global = true, env = "VOICECARDS_MOCK")]
    pub mock: bool,

    /// Log requests, captures and workflow transitions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Discard the stored session token
    Logout,

    /// Show whether a session is stored
    Whoami,

    /// List cards
    List {
        /// all, undone (or pending), doing, done
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one card
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Create a card (prompts for missing fields)
    Create {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        status: Option<CardStatus>,
    },

    /// Edit a card (prompts when no field is given)
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        status: Option<CardStatus>,
    },

    /// Delete a card
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Record a voice note and turn it into cards
    Record {
        /// Use an existing recording instead of the microphone
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show or change settings
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub api_url: Option<String>,
    /// Base URL of an OpenAI-compatible transcription server
    #[arg(long)]
    pub transcription_url: Option<String>,
    #[arg(long)]
    pub transcription_model: Option<String>,
    /// API key for the transcription server
    #[arg(long)]
    pub api_key: Option<String>,
    /// Language hint (ISO-639-1, e.g. "en"); "auto" clears it
    #[arg(long)]
    pub language: Option<String>,
    /// Delete route with an {id} placeholder
    #[arg(long)]
    pub delete_route: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Print the settings file path
    #[arg(long)]
    pub path: bool,
}
