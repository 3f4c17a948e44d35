//! questlog todo command implementations.

use chrono::Utc;
use serde::Serialize;

use crate::cli::CliContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::{self, TodoQuery};
use crate::todo::{
    deadline_countdown, parse_deadline, SortDirection, Todo, TodoDraft, TodoStatus,
};
use crate::watch::FeedEvent;

#[derive(Serialize)]
struct TodoListOutput {
    total: usize,
    todos: Vec<Todo>,
}

pub fn run_new(
    ctx: &CliContext,
    options: OutputOptions,
    title: &str,
    content: Option<String>,
    outdoor: bool,
    deadline: Option<&str>,
) -> Result<()> {
    let user = ctx.require_user()?;
    let deadline = deadline
        .map(|raw| parse_deadline(raw, Utc::now()))
        .transpose()?;
    let draft = TodoDraft::new(title, content, outdoor, deadline)?;

    let todo = ctx.service(&user).create(draft)?;

    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", todo.id.clone());
    human.push_summary("Status", todo.status.to_string());
    human.push_summary("Deadline", deadline_countdown(Utc::now(), todo.deadline));

    emit_success(options, "todo new", &todo, Some(&human))
}

pub fn run_list(
    ctx: &CliContext,
    options: OutputOptions,
    status: &str,
    sort: &str,
) -> Result<()> {
    let user = ctx.require_user()?;
    let query = TodoQuery::new(
        &user.uid,
        TodoStatus::parse(status)?,
        SortDirection::parse(sort)?,
    );
    let todos = query::snapshot(&ctx.store, &query)?;

    let output = TodoListOutput {
        total: todos.len(),
        todos: todos.clone(),
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", todos.len().to_string());
    let now = Utc::now();
    for todo in &todos {
        human.push_detail(list_line(todo, now));
    }

    emit_success(options, "todo list", &output, Some(&human))
}

pub fn run_show(ctx: &CliContext, options: OutputOptions, id: &str) -> Result<()> {
    let user = ctx.require_user()?;
    let todo = ctx.service(&user).get(id)?;

    let mut human = HumanOutput::new(todo.title.clone());
    human.push_summary("ID", todo.id.clone());
    human.push_summary("Status", todo.status.to_string());
    match todo.completed {
        Some(at) => human.push_summary("Completed", at.to_rfc3339()),
        None => human.push_summary("Deadline", deadline_countdown(Utc::now(), todo.deadline)),
    }
    if todo.is_outdoor {
        human.push_summary("Outdoor activity", String::new());
    }
    if !todo.content.is_empty() {
        human.push_detail(todo.content.clone());
    }

    emit_success(options, "todo show", &todo, Some(&human))
}

pub fn run_edit(
    ctx: &CliContext,
    options: OutputOptions,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    outdoor: Option<bool>,
    deadline: Option<&str>,
) -> Result<()> {
    let user = ctx.require_user()?;
    let service = ctx.service(&user);
    let current = service.get(id)?;

    // Unspecified fields keep their stored values; the draft re-validates
    // the merged form before anything is written.
    let deadline = match deadline {
        Some(raw) => parse_deadline(raw, Utc::now())?,
        None => current.deadline,
    };
    let draft = TodoDraft::new(
        title.as_deref().unwrap_or(&current.title),
        Some(content.unwrap_or_else(|| current.content.clone())),
        outdoor.unwrap_or(current.is_outdoor),
        Some(deadline),
    )?;

    let todo = service.edit(id, draft)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", todo.id.clone());
    human.push_summary("Title", todo.title.clone());
    human.push_summary("Deadline", deadline_countdown(Utc::now(), todo.deadline));

    emit_success(options, "todo edit", &todo, Some(&human))
}

pub fn run_done(ctx: &CliContext, options: OutputOptions, id: &str) -> Result<()> {
    let user = ctx.require_user()?;
    let receipt = ctx.service(&user).complete(id)?;

    let mut human = HumanOutput::new("Task completed");
    human.push_summary("ID", receipt.todo.id.clone());
    human.push_summary("Exp awarded", receipt.exp_awarded.to_string());
    human.push_summary("Exp total", receipt.exp_total.to_string());
    human.push_next_step("questlog profile show");

    emit_success(options, "todo done", &receipt, Some(&human))
}

pub fn run_delete(ctx: &CliContext, options: OutputOptions, id: &str) -> Result<()> {
    let user = ctx.require_user()?;
    ctx.service(&user).delete(id)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", id.to_string());

    emit_success(options, "todo delete", &serde_json::json!({ "id": id }), Some(&human))
}

pub fn run_watch(
    ctx: &CliContext,
    options: OutputOptions,
    status: &str,
    sort: &str,
    updates: u32,
) -> Result<()> {
    let user = ctx.require_user()?;
    let query = TodoQuery::new(
        &user.uid,
        TodoStatus::parse(status)?,
        SortDirection::parse(sort)?,
    );
    let feed = query::subscribe(&ctx.store, query, ctx.debounce())?;

    let mut seen: u32 = 0;
    loop {
        let event = match feed.recv_timeout(std::time::Duration::from_secs(3600)) {
            Some(event) => event,
            None => continue,
        };
        match event {
            FeedEvent::Snapshot(todos) => {
                seen += 1;
                print_snapshot(&todos, options)?;
                if updates > 0 && seen >= updates {
                    break;
                }
            }
            FeedEvent::Error(err) => {
                eprintln!("watch: {err}");
            }
        }
    }
    feed.cancel();
    Ok(())
}

fn print_snapshot(todos: &[Todo], options: OutputOptions) -> Result<()> {
    if options.json {
        // One full result set per line.
        println!("{}", serde_json::to_string(todos)?);
        return Ok(());
    }
    if options.quiet {
        return Ok(());
    }
    let now = Utc::now();
    println!("-- {} task(s) at {}", todos.len(), now.to_rfc3339());
    for todo in todos {
        println!("   {}", list_line(todo, now));
    }
    Ok(())
}

fn list_line(todo: &Todo, now: chrono::DateTime<Utc>) -> String {
    let mut line = format!(
        "[{}] {} {} ({})",
        todo.status,
        short_id(&todo.id),
        todo.title,
        deadline_countdown(now, todo.deadline)
    );
    if todo.is_outdoor {
        line.push_str(" - Outdoor Activity!");
    }
    line
}

/// Last six characters, the way the cards render ids
fn short_id(id: &str) -> &str {
    let len = id.len();
    &id[len.saturating_sub(6)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_takes_the_tail() {
        assert_eq!(short_id("01hgw2bbg8yq4n7e"), "yq4n7e");
        assert_eq!(short_id("abc"), "abc");
    }
}
