//! Command-line interface for questlog
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::output::OutputOptions;

mod auth;
mod chat;
mod context;
mod profile;
mod todo;
mod weather;

pub use context::CliContext;

/// questlog - a gamified to-do list
///
/// Tasks, levels, a reply bot, and outdoor conditions, all over a local
/// document store with live-updating views.
#[derive(Parser, Debug)]
#[command(name = "questlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "QUESTLOG_DATA_DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Optional display name shown instead of the email
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Task management
    #[command(subcommand)]
    Todo(TodoCommands),

    /// Profile and leveling
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Talk to the reply bot
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Outdoor conditions plus your active outdoor tasks
    Weather,

    /// Live task dashboard (TUI)
    Dashboard,
}

/// Task management subcommands
#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Create a task (always starts active)
    New {
        title: String,

        /// HTML-formatted body
        #[arg(long)]
        content: Option<String>,

        /// Mark as an outdoor activity
        #[arg(long)]
        outdoor: bool,

        /// RFC 3339 timestamp or a duration from now (2h, 3d); defaults to now
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List your tasks for one status, ordered by deadline
    List {
        #[arg(long, default_value = "active")]
        status: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        sort: String,
    },

    /// Show one task
    Show { id: String },

    /// Edit an active task's mutable fields
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        outdoor: Option<bool>,

        #[arg(long)]
        deadline: Option<String>,
    },

    /// Complete an active task and collect the experience award
    Done { id: String },

    /// Delete a task permanently, in any status
    Delete { id: String },

    /// Stream live snapshots of a task query
    Watch {
        #[arg(long, default_value = "active")]
        status: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        sort: String,

        /// Exit after this many snapshots (0 = run until interrupted)
        #[arg(long, default_value_t = 0)]
        updates: u32,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show level and progress
    Show {
        /// Keep following the profile document
        #[arg(long)]
        watch: bool,
    },

    /// Update display name and/or avatar
    Set {
        #[arg(long)]
        name: Option<String>,

        /// Image file stored as a blob; its URL becomes the photo URL
        #[arg(long)]
        avatar: Option<std::path::PathBuf>,
    },
}

/// Chat subcommands
#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// Send one query to the reply bot
    Send { text: String },

    /// Show the transcript, newest first
    History,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ctx = CliContext::load(self.data_dir)?;
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Signup {
                email,
                password,
                display_name,
            } => auth::run_signup(&ctx, options, &email, &password, display_name),
            Commands::Login { email, password } => {
                auth::run_login(&ctx, options, &email, &password)
            }
            Commands::Logout => auth::run_logout(&ctx, options),
            Commands::Whoami => auth::run_whoami(&ctx, options),

            Commands::Todo(command) => match command {
                TodoCommands::New {
                    title,
                    content,
                    outdoor,
                    deadline,
                } => todo::run_new(&ctx, options, &title, content, outdoor, deadline.as_deref()),
                TodoCommands::List { status, sort } => {
                    todo::run_list(&ctx, options, &status, &sort)
                }
                TodoCommands::Show { id } => todo::run_show(&ctx, options, &id),
                TodoCommands::Edit {
                    id,
                    title,
                    content,
                    outdoor,
                    deadline,
                } => todo::run_edit(
                    &ctx,
                    options,
                    &id,
                    title,
                    content,
                    outdoor,
                    deadline.as_deref(),
                ),
                TodoCommands::Done { id } => todo::run_done(&ctx, options, &id),
                TodoCommands::Delete { id } => todo::run_delete(&ctx, options, &id),
                TodoCommands::Watch {
                    status,
                    sort,
                    updates,
                } => todo::run_watch(&ctx, options, &status, &sort, updates),
            },

            Commands::Profile(command) => match command {
                ProfileCommands::Show { watch } => profile::run_show(&ctx, options, watch),
                ProfileCommands::Set { name, avatar } => {
                    profile::run_set(&ctx, options, name, avatar.as_deref())
                }
            },

            Commands::Chat(command) => match command {
                ChatCommands::Send { text } => chat::run_send(&ctx, options, &text),
                ChatCommands::History => chat::run_history(&ctx, options),
            },

            Commands::Weather => weather::run_weather(&ctx, options),

            Commands::Dashboard => crate::ui::dashboard::run(&ctx),
        }
    }
}
