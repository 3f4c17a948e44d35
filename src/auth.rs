//! Account registry and session management.
//!
//! Accounts live in `auth/accounts.json`, the signed-in uid in
//! `auth/session`. Sign-in failures map to provider-style code/message
//! pairs that the CLI shows verbatim. Passwords are stored as salted
//! SHA-256 digests; this is a local account file, not a network identity
//! provider.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::watch::{spawn_feed, SnapshotFeed};

/// Name of the auth directory within the data directory
pub const AUTH_DIR: &str = "auth";

const ACCOUNTS_FILE: &str = "accounts.json";
const SESSION_FILE: &str = "session";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub uid: String,
    pub email: String,
    password_hash: String,
    salt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The identity handed to the rest of the crate. Constructed here only;
/// everything downstream receives it as an explicit parameter.
#[derive(Debug, Clone, Serialize)]
pub struct UserIdentity {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<&Account> for UserIdentity {
    fn from(account: &Account) -> Self {
        UserIdentity {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
        }
    }
}

impl UserIdentity {
    /// Name shown in headers: display name when set, email otherwise
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone)]
pub struct Auth {
    dir: PathBuf,
}

impl Auth {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join(AUTH_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Register a new account and sign it in
    pub fn sign_up(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let email = normalize_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::AuthFailed {
                code: "auth/weak-password",
                message: format!("password should be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(Error::AuthFailed {
                code: "auth/email-already-in-use",
                message: format!("an account already exists for {email}"),
            });
        }

        let salt = Ulid::new().to_string();
        let account = Account {
            uid: Ulid::new().to_string().to_lowercase(),
            email,
            password_hash: hash_password(&salt, password),
            salt,
            display_name: None,
            photo_url: None,
            created_at: Utc::now(),
        };
        let identity = UserIdentity::from(&account);
        accounts.push(account);
        self.save_accounts(&accounts)?;
        self.write_session(&identity.uid)?;
        tracing::debug!(uid = %identity.uid, "account created");
        Ok(identity)
    }

    /// Sign an existing account in
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let email = normalize_email(email)?;
        let accounts = self.load_accounts()?;
        let account = accounts
            .iter()
            .find(|account| account.email == email)
            .ok_or(Error::AuthFailed {
                code: "auth/user-not-found",
                message: format!("no account for {email}"),
            })?;

        if account.password_hash != hash_password(&account.salt, password) {
            return Err(Error::AuthFailed {
                code: "auth/wrong-password",
                message: "wrong password".to_string(),
            });
        }

        let identity = UserIdentity::from(account);
        self.write_session(&identity.uid)?;
        Ok(identity)
    }

    /// Clear the session
    pub fn sign_out(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Identity of the signed-in user
    pub fn current_user(&self) -> Result<UserIdentity> {
        let uid = self.read_session()?.ok_or(Error::NotSignedIn)?;
        let accounts = self.load_accounts()?;
        accounts
            .iter()
            .find(|account| account.uid == uid)
            .map(UserIdentity::from)
            .ok_or(Error::NotSignedIn)
    }

    /// Update display name and/or photo URL on an account
    pub fn update_profile(
        &self,
        uid: &str,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<UserIdentity> {
        let mut accounts = self.load_accounts()?;
        let account = accounts
            .iter_mut()
            .find(|account| account.uid == uid)
            .ok_or(Error::NotSignedIn)?;

        if let Some(name) = display_name {
            account.display_name = Some(name);
        }
        if let Some(url) = photo_url {
            account.photo_url = Some(url);
        }
        let identity = UserIdentity::from(&*account);
        self.save_accounts(&accounts)?;
        Ok(identity)
    }

    /// Subscribe to session changes: `Some(identity)` while signed in,
    /// `None` otherwise. One snapshot per change to the auth directory.
    pub fn watch_session(&self, debounce: Duration) -> Result<SnapshotFeed<Option<UserIdentity>>> {
        let auth = self.clone();
        spawn_feed(self.dir.clone(), debounce, move || {
            match auth.current_user() {
                Ok(identity) => Ok(Some(identity)),
                Err(Error::NotSignedIn) => Ok(None),
                Err(err) => Err(err),
            }
        })
    }

    fn accounts_path(&self) -> PathBuf {
        self.dir.join(ACCOUNTS_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load_accounts(&self) -> Result<Vec<Account>> {
        let path = self.accounts_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        let data = serde_json::to_vec_pretty(accounts)?;
        fs::write(self.accounts_path(), data)?;
        Ok(())
    }

    fn write_session(&self, uid: &str) -> Result<()> {
        fs::write(self.session_path(), format!("{uid}\n"))?;
        Ok(())
    }

    fn read_session(&self) -> Result<Option<String>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        let uid = raw.trim();
        if uid.is_empty() {
            return Ok(None);
        }
        Ok(Some(uid.to_string()))
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::AuthFailed {
            code: "auth/invalid-email",
            message: "email address is badly formatted".to_string(),
        });
    }
    Ok(email)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
