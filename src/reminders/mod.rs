//! Natural-language reminders: free-form time parsing plus an in-memory
//! one-shot scheduler.
//!
//! The parser turns messages like "remind me tomorrow at 3pm to submit the
//! report" into an absolute UTC fire time and the residual reminder text. The
//! scheduler owns all pending reminders and fires each delivery exactly once.
//! Pending reminders live only as long as the process does.

pub mod parser;
pub mod scheduler;

pub use parser::{ParseError, ParsedReminder, TimeParser};
pub use scheduler::{
    Clock, Deliver, ErrorHook, ReminderId, ReminderScheduler, ReminderView, ScheduleError,
    SystemClock,
};

use serde::Deserialize;

/// Policy knobs for reminder parsing and scheduling.
///
/// All instants are interpreted in the single reference timezone given by
/// `utc_offset_minutes`, never in host-local time.
#[derive(Clone, Debug, Deserialize)]
pub struct ReminderConfig {
    /// Phrases that signal the user wants to be reminded.
    #[serde(default = "default_intent_keywords")]
    pub intent_keywords: Vec<String>,
    /// Hour of day (0-23) that "tonight" resolves to.
    #[serde(default = "default_tonight_hour")]
    pub tonight_hour: u32,
    /// Offset of the reference timezone from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Reject reminders scheduled further ahead than this, if set.
    #[serde(default)]
    pub max_lead_days: Option<i64>,
}

fn default_intent_keywords() -> Vec<String> {
    [
        "remind me",
        "remind us",
        "reminder",
        "alert me",
        "notify me",
        "ping me",
        "tell me",
        "let me know",
        "don't forget",
        "remember to",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_tonight_hour() -> u32 {
    20
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            intent_keywords: default_intent_keywords(),
            tonight_hour: default_tonight_hour(),
            utc_offset_minutes: 0,
            max_lead_days: None,
        }
    }
}
