use crate::reminders::ReminderConfig;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub application_id: u64,
    pub owner_id: Option<u64>,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub hypixel_api_key: Option<String>,
    pub database_url: String,
    pub system_prompt: String,
    pub status_message: String,
    pub max_context_messages: usize,

    // Per-user rate limiting for mention-triggered chat
    pub rate_limit_messages: usize,
    pub rate_limit_secs: u64,

    pub llm_timeout_secs: u64,

    // Reminder parsing/scheduling policy
    pub reminders: ReminderConfig,
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are Skycord, a helpful Discord assistant for a Hypixel Skyblock community. \
You can look up Skyblock stats for linked players, link Discord users to their Minecraft accounts, \
and create reminders. When a user request requires action, you MUST use the appropriate tool. \
Be concise, accurate, and a little playful.";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            application_id: env::var("APPLICATION_ID")
                .map_err(|_| anyhow::anyhow!("APPLICATION_ID must be set"))?
                .parse()
                .map_err(|_| anyhow::anyhow!("APPLICATION_ID must be a valid u64"))?,
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            llm_url: env::var("LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "local-model".to_string()),
            llm_api_key: env::var("LLM_API_KEY").ok(),
            hypixel_api_key: env::var("HYPIXEL_API_KEY").ok(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/skycord.db".to_string()),
            system_prompt: env::var("SYSTEM_PROMPT")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Watching the auction house".to_string()),
            max_context_messages: env::var("MAX_CONTEXT_MESSAGES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            rate_limit_messages: env::var("RATE_LIMIT_MESSAGES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            rate_limit_secs: env::var("RATE_LIMIT_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            reminders: Self::load_reminder_config(),
        })
    }

    /// Reminder policy comes from `reminders.toml` when present, with env
    /// overrides for the scalar knobs. Keyword lists are only configurable
    /// through the file.
    pub fn load_reminder_config() -> ReminderConfig {
        let mut config = if let Ok(content) = fs::read_to_string("reminders.toml") {
            #[derive(Deserialize)]
            struct ReminderWrapper {
                reminders: ReminderConfig,
            }
            match toml::from_str::<ReminderWrapper>(&content) {
                Ok(wrapper) => wrapper.reminders,
                Err(_) => ReminderConfig::default(),
            }
        } else {
            ReminderConfig::default()
        };

        if let Some(hour) = env::var("TONIGHT_HOUR").ok().and_then(|v| v.parse().ok()) {
            config.tonight_hour = hour;
        }
        if let Some(offset) = env::var("UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.utc_offset_minutes = offset;
        }
        if let Some(days) = env::var("REMINDER_MAX_LEAD_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_lead_days = Some(days);
        }

        config
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("owner_id", &self.owner_id)
            .field("llm_url", &self.llm_url)
            .field("llm_model", &self.llm_model)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "hypixel_api_key",
                &self.hypixel_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("database_url", &self.database_url)
            .field("system_prompt", &self.system_prompt)
            .field("status_message", &self.status_message)
            .field("max_context_messages", &self.max_context_messages)
            .field("rate_limit_messages", &self.rate_limit_messages)
            .field("rate_limit_secs", &self.rate_limit_secs)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("reminders", &self.reminders)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing required vars
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("APPLICATION_ID");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when required vars are missing");

        // 2. Defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("APPLICATION_ID", "12345");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.application_id, 12345);
        assert_eq!(config.rate_limit_messages, 5);
        assert_eq!(config.reminders.tonight_hour, 20);

        // 3. Debug redaction
        env::set_var("LLM_API_KEY", "secret_api_key");
        env::set_var("HYPIXEL_API_KEY", "secret_hypixel_key");
        let config_redacted = Config::build().unwrap();
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(!debug_output.contains("secret_hypixel_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("APPLICATION_ID");
        env::remove_var("LLM_API_KEY");
        env::remove_var("HYPIXEL_API_KEY");
    }
}
