//! Live task dashboard.
//!
//! One ratatui view over the signed-in user's task queries. The list only
//! ever re-renders from full feed snapshots: completing or deleting a task
//! writes through the lifecycle service and the next snapshot brings the
//! view up to date. Switching tab or sort direction tears the current feed
//! down before opening the next one, so at most one subscription is live
//! at a time.

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::cli::CliContext;
use crate::error::Result;
use crate::lifecycle::TodoService;
use crate::query::{self, TodoFeed, TodoQuery};
use crate::todo::{deadline_countdown, SortDirection, Todo, TodoStatus};
use crate::watch::FeedEvent;

const EVENT_POLL_MS: u64 = 120;

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);

struct AppState {
    todos: Vec<Todo>,
    selected: Option<usize>,
    status_tab: TodoStatus,
    direction: SortDirection,
    status_message: Option<(String, bool)>,
    exit: bool,
}

impl AppState {
    fn new() -> Self {
        Self {
            todos: Vec::new(),
            selected: None,
            status_tab: TodoStatus::Active,
            direction: SortDirection::Ascending,
            status_message: None,
            exit: false,
        }
    }

    fn apply_snapshot(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        self.selected = match self.selected {
            _ if self.todos.is_empty() => None,
            Some(index) => Some(index.min(self.todos.len() - 1)),
            None => Some(0),
        };
    }

    fn selected_todo(&self) -> Option<&Todo> {
        self.selected.and_then(|index| self.todos.get(index))
    }

    fn move_selection(&mut self, delta: isize) {
        if self.todos.is_empty() {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let last = self.todos.len() as isize - 1;
        self.selected = Some(current.saturating_add(delta).clamp(0, last) as usize);
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), false));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), true));
    }
}

pub fn run(ctx: &CliContext) -> Result<()> {
    let user = ctx.require_user()?;
    let service = ctx.service(&user);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(ctx, &service, &mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn open_feed(ctx: &CliContext, service: &TodoService, state: &AppState) -> Result<TodoFeed> {
    let query = TodoQuery::new(service.user_id(), state.status_tab, state.direction);
    query::subscribe(&ctx.store, query, ctx.debounce())
}

fn event_loop(
    ctx: &CliContext,
    service: &TodoService,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let mut state = AppState::new();
    let mut feed = open_feed(ctx, service, &state)?;

    loop {
        while let Some(event) = feed.try_recv() {
            match event {
                FeedEvent::Snapshot(todos) => state.apply_snapshot(todos),
                FeedEvent::Error(err) => state.error(err),
            }
        }

        terminal.draw(|frame| render(frame, &mut state))?;

        if state.exit {
            feed.cancel();
            return Ok(());
        }

        if !event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if let Some(reopen) = handle_key(key, &mut state, service) {
                if reopen {
                    // Previous subscription goes down before the next one
                    // comes up.
                    feed.cancel();
                    feed = open_feed(ctx, service, &state)?;
                }
            }
        }
    }
}

/// Returns `Some(true)` when the query changed and the feed must be
/// reopened, `Some(false)` for handled keys, `None` for ignored ones.
fn handle_key(key: KeyEvent, state: &mut AppState, service: &TodoService) -> Option<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.exit = true;
        return Some(false);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.exit = true;
            Some(false)
        }
        KeyCode::Tab => {
            state.status_tab = match state.status_tab {
                TodoStatus::Active => TodoStatus::Completed,
                TodoStatus::Completed => TodoStatus::Active,
            };
            state.selected = None;
            Some(true)
        }
        KeyCode::Char('s') => {
            state.direction = match state.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
            Some(true)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.move_selection(1);
            Some(false)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.move_selection(-1);
            Some(false)
        }
        KeyCode::Char('x') => {
            if let Some(todo) = state.selected_todo().cloned() {
                match service.complete(&todo.id) {
                    Ok(receipt) => state.info(format!(
                        "completed '{}' (+{} exp, {} total)",
                        receipt.todo.title, receipt.exp_awarded, receipt.exp_total
                    )),
                    Err(err) => state.error(err.to_string()),
                }
            }
            Some(false)
        }
        KeyCode::Char('d') => {
            if let Some(todo) = state.selected_todo().cloned() {
                match service.delete(&todo.id) {
                    Ok(()) => state.info(format!("deleted '{}'", todo.title)),
                    Err(err) => state.error(err.to_string()),
                }
            }
            Some(false)
        }
        _ => None,
    }
}

fn render(frame: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.size());

    render_tabs(frame, state, chunks[0]);
    render_list(frame, state, chunks[1]);
    render_footer(frame, state, chunks[2]);
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let tab = |label: &str, active: bool| {
        let style = if active {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        Span::styled(label.to_string(), style)
    };
    let direction = match state.direction {
        SortDirection::Ascending => "deadline ↑",
        SortDirection::Descending => "deadline ↓",
    };
    let line = Line::from(vec![
        tab(" Active ", state.status_tab == TodoStatus::Active),
        Span::raw("|"),
        tab(" Completed ", state.status_tab == TodoStatus::Completed),
        Span::styled(format!("  {direction}"), Style::default().fg(COLOR_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_list(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let now = Utc::now();
    let items: Vec<ListItem> = state
        .todos
        .iter()
        .map(|todo| {
            let when = match todo.completed {
                Some(at) => format!("completed {}", at.format("%Y-%m-%d %H:%M")),
                None => deadline_countdown(now, todo.deadline),
            };
            let mut spans = vec![
                Span::styled(todo.title.clone(), Style::default().fg(COLOR_TEXT)),
                Span::styled(format!("  {when}"), Style::default().fg(COLOR_MUTED)),
            ];
            if todo.is_outdoor {
                spans.push(Span::styled(
                    "  outdoor",
                    Style::default().fg(COLOR_SUCCESS),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .highlight_style(
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(state.selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_footer(frame: &mut Frame, state: &AppState, area: Rect) {
    let hints = Line::from(Span::styled(
        " tab switch status · s sort · j/k move · x complete · d delete · q quit",
        Style::default().fg(COLOR_MUTED),
    ));
    let message = match &state.status_message {
        Some((text, is_error)) => {
            let color = if *is_error { COLOR_ERROR } else { COLOR_SUCCESS };
            Line::from(Span::styled(format!(" {text}"), Style::default().fg(color)))
        }
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(vec![hints, message]), area);
}
