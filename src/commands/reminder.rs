use crate::discord_text::truncate_snippet;
use crate::{Context, Error};
use chrono::{Duration as ChronoDuration, Utc};
use humantime::parse_duration;
use tracing::info;

const MAX_REMINDER_MESSAGE_CHARS: usize = 1500;
const MAX_LIST_RESULTS: usize = 20;
const MIN_REMINDER_SECS: u64 = 60;

/// Manage reminders
#[poise::command(slash_command, subcommands("set", "list", "cancel"), guild_only)]
pub async fn reminder(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set a reminder (duration examples: 10m, 2h, 1d 2h)
#[poise::command(slash_command, guild_only)]
pub async fn set(
    ctx: Context<'_>,
    #[description = "How long from now (e.g., 10m, 2h, 1d 2h)"] when: String,
    #[description = "Reminder message"] message: String,
) -> Result<(), Error> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        ctx.say("❌ Reminder message cannot be empty.").await?;
        return Ok(());
    }
    if trimmed.chars().count() > MAX_REMINDER_MESSAGE_CHARS {
        ctx.say(format!(
            "❌ Reminder message is too long (max {} characters).",
            MAX_REMINDER_MESSAGE_CHARS
        ))
        .await?;
        return Ok(());
    }

    let duration = match parse_duration(when.trim()) {
        Ok(duration) => duration,
        Err(_) => {
            ctx.say("❌ Invalid duration. Examples: `10m`, `2h`, `1d 2h`.")
                .await?;
            return Ok(());
        }
    };

    if duration.as_secs() < MIN_REMINDER_SECS {
        ctx.say("❌ Reminders must be at least 1 minute in the future.")
            .await?;
        return Ok(());
    }

    let fire_time = match ChronoDuration::from_std(duration) {
        Ok(delta) => Utc::now() + delta,
        Err(_) => {
            ctx.say("❌ Reminder duration is too large.").await?;
            return Ok(());
        }
    };

    let data = ctx.data();
    let reminder_id = match data.scheduler.schedule(
        fire_time,
        ctx.author().id.get(),
        ctx.channel_id().get(),
        trimmed.to_string(),
        data.deliver.clone(),
    ) {
        Ok(id) => id,
        Err(e) => {
            ctx.say(format!("❌ Couldn't schedule that: {e}.")).await?;
            return Ok(());
        }
    };

    let unix = fire_time.timestamp();
    info!(
        "Created reminder {} for user {} in channel {} at {}",
        reminder_id,
        ctx.author().id,
        ctx.channel_id(),
        fire_time
    );

    ctx.say(format!(
        "✅ Reminder set for <t:{unix}:F> (<t:{unix}:R>). ID: `{reminder_id}`"
    ))
    .await?;
    Ok(())
}

/// List your upcoming reminders
#[poise::command(slash_command, guild_only)]
pub async fn list(
    ctx: Context<'_>,
    #[description = "Max reminders to show (default 10)"]
    #[min = 1]
    #[max = 20]
    limit: Option<u8>,
) -> Result<(), Error> {
    let limit = limit.map(|v| v as usize).unwrap_or(10).min(MAX_LIST_RESULTS);
    let pending = ctx
        .data()
        .scheduler
        .list_pending(Some(ctx.author().id.get()));

    if pending.is_empty() {
        ctx.say("📭 No upcoming reminders.").await?;
        return Ok(());
    }

    let lines: Vec<String> = pending
        .iter()
        .take(limit)
        .map(|view| {
            format!(
                "• `{}` <t:{}:R> in <#{}> — {}",
                view.id,
                view.fire_time.timestamp(),
                view.channel_id,
                truncate_snippet(&view.text, 80)
            )
        })
        .collect();

    ctx.say(format!(
        "**Your upcoming reminders:**\n{}",
        lines.join("\n")
    ))
    .await?;
    Ok(())
}

/// Cancel a pending reminder
#[poise::command(slash_command, guild_only)]
pub async fn cancel(
    ctx: Context<'_>,
    #[description = "Reminder ID to cancel"] reminder_id: i64,
) -> Result<(), Error> {
    // The same message covers unknown ids and other users' reminders, so
    // cancellation never confirms that someone else's reminder exists.
    let canceled = u64::try_from(reminder_id)
        .map(|id| ctx.data().scheduler.cancel(id, ctx.author().id.get()))
        .unwrap_or(false);

    if !canceled {
        ctx.say("❌ No pending reminder found with that ID.").await?;
        return Ok(());
    }

    ctx.say(format!("✅ Reminder `{}` cancelled.", reminder_id))
        .await?;
    Ok(())
}
