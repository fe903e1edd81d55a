//! Memory Page Cache Implementation
//!
//! PageCacheのプロセス内実装（有効期限つき）

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::repositories::page_cache::{key_matches_path, key_path, PageCache};

struct Entry {
    page: Value,
    stored_at: Instant,
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    generations: HashMap<String, u64>,
}

impl State {
    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key_path(key)).copied().unwrap_or(0)
    }
}

/// メモリ上のページキャッシュ
pub struct MemoryPageCache {
    state: Mutex<State>,
    enabled: bool,
    ttl: Option<Duration>,
}

impl MemoryPageCache {
    /// 新しいキャッシュを作成
    ///
    /// # Arguments
    ///
    /// * `ttl` - 有効期限。`None` なら無効化されるまで保持する
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            enabled: true,
            ttl,
        }
    }

    /// 何も保存しないキャッシュ
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(None)
        }
    }

    /// 設定値から作成（`ttl_seconds` が0なら期限なし）
    pub fn from_settings(enabled: bool, ttl_seconds: u64) -> Self {
        if !enabled {
            return Self::disabled();
        }
        let ttl = (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds));
        Self::new(ttl)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        match self.ttl {
            Some(ttl) => entry.stored_at.elapsed() < ttl,
            None => true,
        }
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let mut state = self.state.lock().ok()?;

        let fresh = self.is_fresh(state.entries.get(key)?);
        if fresh {
            state.entries.get(key).map(|entry| entry.page.clone())
        } else {
            state.entries.remove(key);
            None
        }
    }

    fn generation(&self, key: &str) -> u64 {
        self.state.lock().map(|s| s.generation(key)).unwrap_or(0)
    }

    fn put_if_unchanged(&self, key: &str, generation: u64, page: Value) -> bool {
        if !self.enabled {
            return false;
        }
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.generation(key) != generation {
            debug!("Skipped caching {}: invalidated while loading", key);
            return false;
        }

        state.entries.insert(
            key.to_string(),
            Entry {
                page,
                stored_at: Instant::now(),
            },
        );
        true
    }

    fn invalidate(&self, path: &str) {
        if let Ok(mut state) = self.state.lock() {
            *state.generations.entry(path.to_string()).or_insert(0) += 1;

            let before = state.entries.len();
            state.entries.retain(|key, _| !key_matches_path(key, path));
            debug!(
                "Invalidated {} cached pages for {}",
                before - state.entries.len(),
                path
            );
        }
    }
}
