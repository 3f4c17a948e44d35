//! Profile mirror and the leveling accumulator.
//!
//! The profile document is a single per-user record whose `exp` counter is
//! incremented by task completion. Level and progress are pure derivations
//! of that counter; the mirror feed simply re-derives on every snapshot.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{Store, USERS};
use crate::watch::{spawn_feed, SnapshotFeed};

/// Per-user profile document. Unknown fields are preserved by the store's
/// merge writes and ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub exp: u64,
}

/// Level and progress derived from an experience total. No upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level: u64,
    pub exp_in_level: u64,
    pub level_size: u64,
}

impl LevelProgress {
    pub fn from_exp(exp: u64, level_size: u64) -> Self {
        Self {
            level: exp / level_size + 1,
            exp_in_level: exp % level_size,
            level_size,
        }
    }

    /// Progress through the current level as a fraction in `[0, 1)`
    pub fn fraction(&self) -> f64 {
        self.exp_in_level as f64 / self.level_size as f64
    }
}

/// Load a profile; a missing document or field reads as `exp = 0`.
pub fn load_profile(store: &Store, user_id: &str) -> Result<Profile> {
    Ok(store.read::<Profile>(USERS, user_id)?.unwrap_or_default())
}

/// A live single-document profile subscription
pub type ProfileFeed = SnapshotFeed<Profile>;

/// Mirror one profile document: an immediate snapshot, then one per
/// change. Released on view teardown or user change.
pub fn subscribe_profile(store: &Store, user_id: &str, debounce: Duration) -> Result<ProfileFeed> {
    let dir = store.collection_dir(USERS);
    let store = store.clone();
    let user_id = user_id.to_string();
    spawn_feed(dir, debounce, move || load_profile(&store, &user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::FeedEvent;
    use tempfile::TempDir;

    #[test]
    fn accumulator_anchor_points() {
        let cases = [
            (0, 1, 0),
            (99, 1, 99),
            (100, 2, 0),
            (250, 3, 50),
        ];
        for (exp, level, exp_in_level) in cases {
            let progress = LevelProgress::from_exp(exp, 100);
            assert_eq!(progress.level, level, "exp={exp}");
            assert_eq!(progress.exp_in_level, exp_in_level, "exp={exp}");
        }
    }

    #[test]
    fn fraction_is_progress_over_level_size() {
        let progress = LevelProgress::from_exp(250, 100);
        assert!((progress.fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_profile_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), 2000).unwrap();

        let profile = load_profile(&store, "nobody").unwrap();
        assert_eq!(profile.exp, 0);
    }

    #[test]
    fn profile_with_extra_fields_still_loads() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), 2000).unwrap();

        store
            .write(USERS, "u1", &serde_json::json!({"exp": 120, "nickname": "sam"}))
            .unwrap();
        let profile = load_profile(&store, "u1").unwrap();
        assert_eq!(profile.exp, 120);
    }

    #[test]
    fn mirror_pushes_new_totals() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path(), 2000).unwrap();

        let feed = subscribe_profile(&store, "u1", Duration::from_millis(50)).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut latest = None;
        store.increment_merge(USERS, "u1", "exp", 50).unwrap();
        while std::time::Instant::now() < deadline {
            match feed.recv_timeout(Duration::from_secs(5)) {
                Some(FeedEvent::Snapshot(profile)) => {
                    if profile.exp == 50 {
                        return;
                    }
                    latest = Some(profile.exp);
                }
                Some(FeedEvent::Error(err)) => panic!("feed error: {err}"),
                None => break,
            }
        }
        panic!("expected exp=50, last seen {latest:?}");
    }
}
