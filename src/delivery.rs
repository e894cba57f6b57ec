use crate::reminders::{Deliver, ReminderId, ReminderView};
use async_trait::async_trait;
use serenity::all::{ChannelId, CreateAllowedMentions, CreateMessage, UserId};
use serenity::http::Http;
use std::sync::Arc;
use tracing::{debug, error};

/// Sends due reminders back into the Discord channel they were created in.
pub struct DiscordDeliver {
    http: Arc<Http>,
}

impl DiscordDeliver {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Deliver for DiscordDeliver {
    async fn deliver(&self, reminder: &ReminderView) -> anyhow::Result<()> {
        let ts = reminder.fire_time.timestamp();
        let content = format!(
            "⏰ <@{}> Reminder: {}\nDue: <t:{ts}:F> (<t:{ts}:R>)",
            reminder.owner_id, reminder.text
        );

        let allowed_mentions =
            CreateAllowedMentions::new().users(vec![UserId::new(reminder.owner_id)]);
        let builder = CreateMessage::new()
            .content(content)
            .allowed_mentions(allowed_mentions);

        debug!(
            "Dispatching reminder {} to channel {} for user {}",
            reminder.id, reminder.channel_id, reminder.owner_id
        );

        ChannelId::new(reminder.channel_id)
            .send_message(&self.http, builder)
            .await?;

        Ok(())
    }
}

/// Default error hook: delivery failures are logged, never retried.
pub fn log_delivery_failure(id: ReminderId, error: &anyhow::Error) {
    error!("Reminder {} could not be delivered: {}", id, error);
}
