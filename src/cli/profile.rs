//! questlog profile command implementations.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::blobs::BlobStore;
use crate::cli::CliContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::profile::{self, LevelProgress, Profile};
use crate::watch::FeedEvent;

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct ProfileOutput {
    exp: u64,
    level: u64,
    exp_in_level: u64,
    level_size: u64,
}

pub fn run_show(ctx: &CliContext, options: OutputOptions, watch: bool) -> Result<()> {
    let user = ctx.require_user()?;

    if watch {
        return run_show_watch(ctx, options, &user.uid);
    }

    let profile = profile::load_profile(&ctx.store, &user.uid)?;
    emit_profile(ctx, options, user.label(), &profile)
}

fn run_show_watch(ctx: &CliContext, options: OutputOptions, uid: &str) -> Result<()> {
    let feed = profile::subscribe_profile(&ctx.store, uid, ctx.debounce())?;
    loop {
        match feed.recv_timeout(Duration::from_secs(3600)) {
            Some(FeedEvent::Snapshot(profile)) => {
                let progress = LevelProgress::from_exp(profile.exp, ctx.config.exp.level_size);
                if options.json {
                    println!("{}", serde_json::to_string(&progress)?);
                } else if !options.quiet {
                    println!("{}", level_line(&progress));
                }
            }
            Some(FeedEvent::Error(err)) => eprintln!("watch: {err}"),
            None => continue,
        }
    }
}

fn emit_profile(
    ctx: &CliContext,
    options: OutputOptions,
    label: &str,
    profile: &Profile,
) -> Result<()> {
    let progress = LevelProgress::from_exp(profile.exp, ctx.config.exp.level_size);
    let output = ProfileOutput {
        exp: profile.exp,
        level: progress.level,
        exp_in_level: progress.exp_in_level,
        level_size: progress.level_size,
    };

    let mut human = HumanOutput::new(label.to_string());
    human.push_summary("Experience", profile.exp.to_string());
    human.push_detail(level_line(&progress));
    human.push_detail(progress_bar(&progress));

    emit_success(options, "profile show", &output, Some(&human))
}

pub fn run_set(
    ctx: &CliContext,
    options: OutputOptions,
    name: Option<String>,
    avatar: Option<&Path>,
) -> Result<()> {
    let user = ctx.require_user()?;

    let photo_url = match avatar {
        Some(path) => {
            let blobs = BlobStore::open(&ctx.data_dir)?;
            Some(blobs.put_file(path)?)
        }
        None => None,
    };

    let identity = ctx.auth.update_profile(&user.uid, name, photo_url)?;

    let mut human = HumanOutput::new("Profile updated");
    if let Some(name) = identity.display_name.as_deref() {
        human.push_summary("Display name", name.to_string());
    }
    if let Some(url) = identity.photo_url.as_deref() {
        human.push_summary("Photo", url.to_string());
    }

    emit_success(options, "profile set", &identity, Some(&human))
}

fn level_line(progress: &LevelProgress) -> String {
    format!(
        "Lv. {} - EXP {}/{}",
        progress.level, progress.exp_in_level, progress.level_size
    )
}

fn progress_bar(progress: &LevelProgress) -> String {
    let filled = (progress.fraction() * PROGRESS_BAR_WIDTH as f64) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
