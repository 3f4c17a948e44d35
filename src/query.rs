//! Live filtered task queries.
//!
//! A query is always scoped `(author, status)` and ordered by deadline.
//! [`snapshot`] materializes the full matching set once; [`subscribe`]
//! opens a standing feed that re-delivers the full set on every store
//! change. There is no pagination and no diffing. A view switching its
//! filter or direction drops its old feed before opening the next one.

use std::time::Duration;

use crate::error::Result;
use crate::store::{Store, TODOS};
use crate::todo::{sort_todos, SortDirection, Todo, TodoStatus};
use crate::watch::{spawn_feed, SnapshotFeed};

#[derive(Debug, Clone)]
pub struct TodoQuery {
    pub author: String,
    pub status: TodoStatus,
    pub direction: SortDirection,
}

impl TodoQuery {
    pub fn new(author: impl Into<String>, status: TodoStatus, direction: SortDirection) -> Self {
        Self {
            author: author.into(),
            status,
            direction,
        }
    }

    fn matches(&self, todo: &Todo) -> bool {
        todo.author == self.author && todo.status == self.status
    }
}

/// Materialize the full result set for a query
pub fn snapshot(store: &Store, query: &TodoQuery) -> Result<Vec<Todo>> {
    let mut todos: Vec<Todo> = store
        .list::<Todo>(TODOS)?
        .into_iter()
        .filter(|todo| query.matches(todo))
        .collect();
    sort_todos(&mut todos, query.direction);
    Ok(todos)
}

/// A live task-list subscription
pub type TodoFeed = SnapshotFeed<Vec<Todo>>;

/// Open a standing subscription for a query. Every matching change pushes
/// the full current result set; the caller releases the handle when the
/// view goes away.
pub fn subscribe(store: &Store, query: TodoQuery, debounce: Duration) -> Result<TodoFeed> {
    let dir = store.collection_dir(TODOS);
    let store = store.clone();
    spawn_feed(dir, debounce, move || snapshot(&store, &query))
}
