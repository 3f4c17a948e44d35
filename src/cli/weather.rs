//! questlog weather command implementation.

use chrono::Utc;
use serde::Serialize;

use crate::cli::CliContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::{self, TodoQuery};
use crate::todo::{deadline_countdown, SortDirection, Todo, TodoStatus};
use crate::weather::{WeatherClient, WeatherReport};

#[derive(Serialize)]
struct WeatherOutput {
    report: WeatherReport,
    outdoor_tasks: Vec<Todo>,
}

pub fn run_weather(ctx: &CliContext, options: OutputOptions) -> Result<()> {
    let user = ctx.require_user()?;

    // Fetched once per invocation, independently of each other and of the
    // task list.
    let report = WeatherClient::new(&ctx.config.weather).report()?;

    let query = TodoQuery::new(&user.uid, TodoStatus::Active, SortDirection::Ascending);
    let outdoor_tasks: Vec<Todo> = query::snapshot(&ctx.store, &query)?
        .into_iter()
        .filter(|todo| todo.is_outdoor)
        .collect();

    let mut human = HumanOutput::new("It's a good day!");
    human.push_summary("PSI", report.psi.to_string());
    human.push_summary("UV", report.uv_index.to_string());
    let now = Utc::now();
    human.push_detail("Here are your outdoor tasks!".to_string());
    for todo in &outdoor_tasks {
        human.push_detail(format!(
            "{} ({})",
            todo.title,
            deadline_countdown(now, todo.deadline)
        ));
    }

    let output = WeatherOutput {
        report,
        outdoor_tasks,
    };
    emit_success(options, "weather", &output, Some(&human))
}
