//! Task lifecycle transitions.
//!
//! [`TodoService`] binds the document store to one signed-in user and
//! exposes the four transitions: create, edit, complete, delete. The
//! session identity is injected at construction; nothing here reads
//! ambient state.

use chrono::Utc;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::{Store, TODOS, USERS};
use crate::todo::{Todo, TodoDraft, TodoStatus};

/// Field of the profile document holding the experience counter
pub const EXP_FIELD: &str = "exp";

#[derive(Debug, Clone)]
pub struct TodoService {
    store: Store,
    user_id: String,
    exp_award: u64,
}

/// Outcome of a completion: the updated task and the owner's new total
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReceipt {
    pub todo: Todo,
    pub exp_awarded: u64,
    pub exp_total: u64,
}

impl TodoService {
    pub fn new(store: Store, user_id: impl Into<String>, exp_award: u64) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            exp_award,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Load a task by id
    pub fn get(&self, id: &str) -> Result<Todo> {
        self.store
            .read::<Todo>(TODOS, id)?
            .ok_or_else(|| Error::TodoNotFound(id.to_string()))
    }

    /// Create a new task. Always starts `active`, authored by the bound
    /// user. One store write; failures surface to the caller unretried.
    pub fn create(&self, draft: TodoDraft) -> Result<Todo> {
        let todo = Todo {
            id: Store::generate_id(),
            title: draft.title,
            content: draft.content,
            author: self.user_id.clone(),
            status: TodoStatus::Active,
            is_outdoor: draft.is_outdoor,
            deadline: draft.deadline,
            completed: None,
        };
        self.store.write(TODOS, &todo.id, &todo)?;
        tracing::debug!(id = %todo.id, "task created");
        Ok(todo)
    }

    /// Overwrite the mutable fields of an active task. `status` and
    /// `author` are re-asserted from the stored document, and the edit is
    /// refused outright once the task is completed.
    pub fn edit(&self, id: &str, draft: TodoDraft) -> Result<Todo> {
        let current = self.get(id)?;
        if current.status == TodoStatus::Completed {
            return Err(Error::EditCompleted(id.to_string()));
        }
        let todo = Todo {
            id: current.id,
            title: draft.title,
            content: draft.content,
            author: current.author,
            status: current.status,
            is_outdoor: draft.is_outdoor,
            deadline: draft.deadline,
            completed: current.completed,
        };
        self.store.write(TODOS, &todo.id, &todo)?;
        Ok(todo)
    }

    /// Complete an active task and award experience to its owner.
    ///
    /// Two independent writes, in order: the task document gets
    /// `status = completed` plus a completion timestamp, then the owner's
    /// profile counter is incremented by the configured award. The pair is
    /// not transactional: if the second write fails, the task stays
    /// completed with no award, and the error surfaces to the caller.
    /// Re-invoking on a completed task is refused, so the award is never
    /// paid twice.
    pub fn complete(&self, id: &str) -> Result<CompletionReceipt> {
        let mut todo = self.get(id)?;
        if todo.status == TodoStatus::Completed {
            return Err(Error::AlreadyCompleted(id.to_string()));
        }
        todo.status = TodoStatus::Completed;
        todo.completed = Some(Utc::now());
        self.store.write(TODOS, &todo.id, &todo)?;

        let exp_total = self
            .store
            .increment_merge(USERS, &todo.author, EXP_FIELD, self.exp_award)
            .inspect_err(|err| {
                tracing::warn!(id = %todo.id, %err, "task completed but award write failed");
            })?;

        Ok(CompletionReceipt {
            todo,
            exp_awarded: self.exp_award,
            exp_total,
        })
    }

    /// Delete a task permanently, in any status. No tombstone, no undo.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(TODOS, id)? {
            return Err(Error::TodoNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> TodoService {
        let store = Store::open(dir.path(), 2000).expect("open store");
        TodoService::new(store, "user-1", 50)
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft::new(title, None, false, None).expect("valid draft")
    }

    #[test]
    fn create_is_active_and_owned() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let todo = service.create(draft("buy groceries")).unwrap();
        assert_eq!(todo.status, TodoStatus::Active);
        assert_eq!(todo.author, "user-1");
        assert!(todo.completed.is_none());

        let stored = service.get(&todo.id).unwrap();
        assert_eq!(stored.title, "buy groceries");
    }

    #[test]
    fn edit_keeps_status_and_author() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let todo = service.create(draft("old title")).unwrap();
        let edited = service.edit(&todo.id, draft("new title")).unwrap();

        assert_eq!(edited.title, "new title");
        assert_eq!(edited.status, TodoStatus::Active);
        assert_eq!(edited.author, "user-1");
    }

    #[test]
    fn edit_refused_once_completed() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let todo = service.create(draft("done soon")).unwrap();
        service.complete(&todo.id).unwrap();

        let err = service.edit(&todo.id, draft("rewrite")).expect_err("guard");
        assert!(matches!(err, Error::EditCompleted(_)));

        // The guard left the document untouched.
        let stored = service.get(&todo.id).unwrap();
        assert_eq!(stored.status, TodoStatus::Completed);
        assert_eq!(stored.title, "done soon");
    }

    #[test]
    fn complete_sets_timestamp_and_awards_exp() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let todo = service.create(draft("run 5k")).unwrap();
        let receipt = service.complete(&todo.id).unwrap();

        assert_eq!(receipt.todo.status, TodoStatus::Completed);
        assert!(receipt.todo.completed.is_some());
        assert_eq!(receipt.exp_awarded, 50);
        assert_eq!(receipt.exp_total, 50);
    }

    #[test]
    fn complete_twice_is_refused_and_awards_once() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let todo = service.create(draft("once only")).unwrap();
        service.complete(&todo.id).unwrap();

        let err = service.complete(&todo.id).expect_err("guard");
        assert!(matches!(err, Error::AlreadyCompleted(_)));

        let profile: serde_json::Value = service
            .store()
            .read(USERS, "user-1")
            .unwrap()
            .expect("profile document");
        assert_eq!(profile[EXP_FIELD], 50);
    }

    #[test]
    fn delete_works_in_any_status() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let active = service.create(draft("active one")).unwrap();
        let done = service.create(draft("done one")).unwrap();
        service.complete(&done.id).unwrap();

        service.delete(&active.id).unwrap();
        service.delete(&done.id).unwrap();

        assert!(matches!(
            service.get(&active.id),
            Err(Error::TodoNotFound(_))
        ));
        assert!(matches!(service.get(&done.id), Err(Error::TodoNotFound(_))));
    }

    #[test]
    fn delete_missing_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let err = service.delete("no-such-id").expect_err("missing");
        assert!(matches!(err, Error::TodoNotFound(_)));
    }
}
