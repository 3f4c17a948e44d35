//! CLI context: data-directory resolution and collaborator wiring.
//!
//! Everything downstream of the CLI receives its collaborators from here
//! as explicit values; no command reads ambient state on its own.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::auth::{Auth, UserIdentity};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lifecycle::TodoService;
use crate::store::Store;

pub struct CliContext {
    pub data_dir: PathBuf,
    pub config: Config,
    pub store: Store,
    pub auth: Auth,
}

impl CliContext {
    /// Resolve the data directory (flag/env first, platform dir otherwise)
    /// and open the store and account registry under it.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir)?;
        fs::create_dir_all(&data_dir)?;
        let config = Config::load_from_data_dir(&data_dir);
        let store = Store::open(&data_dir, config.store.lock_timeout_ms)?;
        let auth = Auth::open(&data_dir)?;
        Ok(Self {
            data_dir,
            config,
            store,
            auth,
        })
    }

    /// Identity of the signed-in user, or `NotSignedIn`
    pub fn require_user(&self) -> Result<UserIdentity> {
        self.auth.current_user()
    }

    /// Lifecycle service bound to one user
    pub fn service(&self, user: &UserIdentity) -> TodoService {
        TodoService::new(self.store.clone(), &user.uid, self.config.exp.award)
    }

    /// Debounce applied to live feeds
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.store.watch_debounce_ms)
    }
}

fn resolve_data_dir(cli_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir);
    }
    let dirs = ProjectDirs::from("", "", "questlog")
        .ok_or_else(|| Error::OperationFailed("cannot determine a data directory".to_string()))?;
    Ok(dirs.data_dir().to_path_buf())
}
