//! questlog account command implementations.

use crate::cli::CliContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run_signup(
    ctx: &CliContext,
    options: OutputOptions,
    email: &str,
    password: &str,
    display_name: Option<String>,
) -> Result<()> {
    let mut identity = ctx.auth.sign_up(email, password)?;
    if let Some(name) = display_name {
        identity = ctx.auth.update_profile(&identity.uid, Some(name), None)?;
    }

    let mut human = HumanOutput::new("Hey, welcome!");
    human.push_summary("Email", identity.email.clone());
    human.push_summary("User id", identity.uid.clone());
    human.push_next_step("questlog todo new \"my first task\"");

    emit_success(options, "signup", &identity, Some(&human))
}

pub fn run_login(
    ctx: &CliContext,
    options: OutputOptions,
    email: &str,
    password: &str,
) -> Result<()> {
    let identity = ctx.auth.sign_in(email, password)?;

    let mut human = HumanOutput::new("Welcome back!");
    human.push_summary("Signed in as", identity.label().to_string());

    emit_success(options, "login", &identity, Some(&human))
}

pub fn run_logout(ctx: &CliContext, options: OutputOptions) -> Result<()> {
    ctx.auth.sign_out()?;

    let human = HumanOutput::new("Signed out");
    emit_success(options, "logout", &serde_json::json!({}), Some(&human))
}

pub fn run_whoami(ctx: &CliContext, options: OutputOptions) -> Result<()> {
    let identity = ctx.require_user()?;

    let mut human = HumanOutput::new("Signed in");
    human.push_summary("User id", identity.uid.clone());
    human.push_summary("Email", identity.email.clone());
    if let Some(name) = identity.display_name.as_deref() {
        human.push_summary("Display name", name.to_string());
    }
    if let Some(url) = identity.photo_url.as_deref() {
        human.push_summary("Photo", url.to_string());
    }

    emit_success(options, "whoami", &identity, Some(&human))
}
