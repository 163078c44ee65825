//! Per-user conversation context store
//!
//! Process-wide keyed store of recent turns. Mutation for one user is
//! serialized by a per-entry mutex; different users never contend on the
//! same lock. History is FIFO-capped and idle users can be evicted to bound
//! memory over the process lifetime.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use shopsaver_config::constants::history;
use shopsaver_core::ConversationTurn;

struct UserHistory {
    turns: VecDeque<ConversationTurn>,
    last_active: Instant,
}

impl UserHistory {
    fn new(cap: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(cap),
            last_active: Instant::now(),
        }
    }
}

/// Bounded per-user conversation history
pub struct ConversationContextStore {
    users: DashMap<String, Mutex<UserHistory>>,
    max_turns: usize,
}

impl ConversationContextStore {
    /// Create a store with the default per-user cap
    pub fn new() -> Self {
        Self::with_capacity(history::MAX_TURNS_PER_USER)
    }

    /// Create a store with an explicit per-user cap
    pub fn with_capacity(max_turns: usize) -> Self {
        Self {
            users: DashMap::new(),
            max_turns: max_turns.max(1),
        }
    }

    /// Append a turn for a user, evicting the oldest beyond the cap.
    ///
    /// The per-entry mutex serializes concurrent writes for the same user,
    /// so duplicate webhook deliveries cannot corrupt the history length.
    pub fn record(&self, turn: ConversationTurn) {
        let entry = self
            .users
            .entry(turn.user_id.clone())
            .or_insert_with(|| Mutex::new(UserHistory::new(self.max_turns)));
        let mut history = entry.lock();
        if history.turns.len() >= self.max_turns {
            history.turns.pop_front();
        }
        history.turns.push_back(turn);
        history.last_active = Instant::now();
    }

    /// Up to `n` most recent turns for a user, most-recent last.
    ///
    /// Returns an empty vec for unknown users.
    pub fn recent(&self, user_id: &str, n: usize) -> Vec<ConversationTurn> {
        match self.users.get(user_id) {
            Some(entry) => {
                let history = entry.lock();
                let skip = history.turns.len().saturating_sub(n);
                history.turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Number of recorded turns for a user
    pub fn turn_count(&self, user_id: &str) -> usize {
        self.users
            .get(user_id)
            .map(|entry| entry.lock().turns.len())
            .unwrap_or(0)
    }

    /// Number of users currently tracked
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Drop users idle longer than `max_age`. Returns how many were evicted.
    pub fn evict_idle(&self, max_age: Duration) -> usize {
        let before = self.users.len();
        self.users
            .retain(|_, history| history.lock().last_active.elapsed() < max_age);
        let evicted = before - self.users.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle conversation histories");
        }
        evicted
    }
}

impl Default for ConversationContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsaver_core::HandlerLabel;

    fn turn(user: &str, msg: &str) -> ConversationTurn {
        ConversationTurn::new(user, msg, HandlerLabel::Help)
    }

    #[test]
    fn test_unknown_user_is_empty() {
        let store = ConversationContextStore::new();
        assert!(store.recent("nobody", 5).is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let store = ConversationContextStore::new();
        for i in 0..15 {
            store.record(turn("u1", &format!("message {i}")));
        }

        let recent = store.recent("u1", 10);
        assert_eq!(recent.len(), 10);
        // Oldest five evicted; history starts at message 5
        assert_eq!(recent[0].message, "message 5");
        assert_eq!(recent[9].message, "message 14");
    }

    #[test]
    fn test_recent_is_most_recent_last() {
        let store = ConversationContextStore::new();
        store.record(turn("u1", "first"));
        store.record(turn("u1", "second"));
        store.record(turn("u1", "third"));

        let recent = store.recent("u1", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
        assert_eq!(recent[1].message, "third");
    }

    #[test]
    fn test_users_are_independent() {
        let store = ConversationContextStore::new();
        store.record(turn("u1", "hello"));
        store.record(turn("u2", "hi"));

        assert_eq!(store.turn_count("u1"), 1);
        assert_eq!(store.turn_count("u2"), 1);
        assert_eq!(store.user_count(), 2);
    }

    #[test]
    fn test_evict_idle() {
        let store = ConversationContextStore::new();
        store.record(turn("u1", "hello"));
        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.evict_idle(Duration::ZERO), 1);
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_concurrent_same_user_writes() {
        use std::sync::Arc;
        let store = Arc::new(ConversationContextStore::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store.record(ConversationTurn::new(
                        "u1",
                        format!("t{t} m{i}"),
                        HandlerLabel::Help,
                    ));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // History length stays consistent under concurrent writes
        assert_eq!(store.turn_count("u1"), 10);
    }
}
