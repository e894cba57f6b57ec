use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Sliding-window per-user rate limiter for mention-triggered chat.
pub struct RateLimiter {
    max_messages: usize,
    window: Duration,
    timestamps: Mutex<HashMap<u64, VecDeque<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(max_messages: usize, window_secs: u64) -> Self {
        Self {
            max_messages,
            window: Duration::seconds(window_secs as i64),
            timestamps: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `user_id` and report whether it is allowed.
    pub fn check(&self, user_id: u64) -> bool {
        self.check_at(user_id, Utc::now())
    }

    fn check_at(&self, user_id: u64, now: DateTime<Utc>) -> bool {
        let mut timestamps = self.timestamps.lock().unwrap();
        let entry = timestamps.entry(user_id).or_default();

        while entry
            .front()
            .is_some_and(|first| now - *first > self.window)
        {
            entry.pop_front();
        }

        if entry.len() >= self.max_messages {
            return false;
        }

        entry.push_back(now);
        true
    }
}
