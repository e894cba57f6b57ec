use crate::reminders::{Deliver, ReminderScheduler};
use crate::tools::{schema_of, typed_params, Tool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize, JsonSchema)]
pub struct CreateReminderParams {
    /// Discord user id as a string
    pub user_id: String,
    /// Discord channel id where the reminder should be sent
    pub channel_id: String,
    /// The reminder message content
    pub message: String,
    /// ISO 8601 timestamp when the reminder should fire
    /// (e.g. "2024-03-15T14:30:00Z")
    pub time: String,
}

/// Lets the LLM schedule reminders with an explicit timestamp. The scheduler
/// re-validates the fire time; model-supplied timestamps are not trusted.
pub struct CreateReminderTool {
    pub scheduler: Arc<ReminderScheduler>,
    pub deliver: Arc<dyn Deliver>,
}

#[async_trait]
impl Tool for CreateReminderTool {
    fn name(&self) -> &str {
        "create_reminder"
    }

    fn description(&self) -> &str {
        "Create a reminder that will notify the user at a specific time. The reminder is \
         sent as a message in the given channel."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CreateReminderParams>()
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let params: CreateReminderParams = typed_params(params)?;

        let owner_id: u64 = params
            .user_id
            .parse()
            .map_err(|_| anyhow::anyhow!("user_id must be a numeric Discord id"))?;
        let channel_id: u64 = params
            .channel_id
            .parse()
            .map_err(|_| anyhow::anyhow!("channel_id must be a numeric Discord id"))?;
        let fire_time: DateTime<Utc> = DateTime::parse_from_rfc3339(&params.time)
            .map_err(|e| anyhow::anyhow!("time must be an ISO 8601 timestamp: {e}"))?
            .with_timezone(&Utc);

        match self.scheduler.schedule(
            fire_time,
            owner_id,
            channel_id,
            params.message.clone(),
            self.deliver.clone(),
        ) {
            Ok(id) => Ok(json!({
                "result": "Reminder scheduled.",
                "reminder_id": id,
                "fire_time_unix": fire_time.timestamp(),
            })),
            // Soft error so the model can rephrase or pick a new time.
            Err(e) => Ok(json!({ "error": e.to_string() })),
        }
    }
}
