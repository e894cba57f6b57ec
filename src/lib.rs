pub mod commands;
pub mod config;
pub mod context;
pub mod db;
pub mod delivery;
pub mod discord_text;
pub mod hypixel;
pub mod llm;
pub mod mention;
pub mod personality;
pub mod rate_limit;
pub mod reminders;
pub mod tools;

use std::sync::Arc;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub llm_client: llm::LlmClient,
    pub db: db::Database,
    pub hypixel: Arc<hypixel::HypixelClient>,
    pub conversations: context::ConversationStore,
    pub rate_limiter: rate_limit::RateLimiter,
    pub personality: personality::PersonalityTracker,
    pub tools: Arc<tools::ToolRegistry>,
    pub parser: reminders::TimeParser,
    pub scheduler: Arc<reminders::ReminderScheduler>,
    pub deliver: Arc<dyn reminders::Deliver>,
    /// Bot's own user ID for mention stripping and context formatting
    pub bot_id: u64,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
