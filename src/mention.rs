use crate::discord_text::{split_for_discord, strip_bot_mentions};
use crate::reminders::ParseError;
use crate::{Data, Error};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Handle a message where the bot is mentioned/tagged (or a DM).
pub async fn handle_mention(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    info!(
        "Handling mention from {} in channel {}: {}",
        new_message.author.name, new_message.channel_id, new_message.content
    );

    let prompt = strip_bot_mentions(&new_message.content, data.bot_id);
    if prompt.trim().is_empty() {
        // Avoid a full LLM round-trip when someone only pings the bot.
        new_message.reply(&ctx.http, "Hi! How can I help?").await?;
        return Ok(());
    }

    if !data.rate_limiter.check(new_message.author.id.get()) {
        new_message
            .reply(
                &ctx.http,
                "⏱️ You're sending messages too quickly. Give it a moment.",
            )
            .await?;
        return Ok(());
    }

    data.personality.record_interaction(&prompt);

    // Reminder requests are handled locally; everything else goes to the LLM.
    if data.parser.detect(&prompt) {
        return handle_reminder_request(ctx, new_message, data, &prompt).await;
    }

    chat_with_llm(ctx, new_message, data, &prompt).await
}

async fn handle_reminder_request(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
    prompt: &str,
) -> Result<(), Error> {
    let reply = match data.parser.parse(prompt, Utc::now()) {
        Ok(parsed) => {
            let schedule_result = data.scheduler.schedule(
                parsed.fire_time,
                new_message.author.id.get(),
                new_message.channel_id.get(),
                parsed.text.clone(),
                data.deliver.clone(),
            );
            match schedule_result {
                Ok(id) => {
                    let unix = parsed.fire_time.timestamp();
                    info!(
                        "Created reminder {} for user {} in channel {} at {}",
                        id, new_message.author.id, new_message.channel_id, parsed.fire_time
                    );
                    format!(
                        "✅ I'll remind you <t:{unix}:F> (<t:{unix}:R>): {}\nID: `{id}` — cancel with `/reminder cancel`.",
                        parsed.text
                    )
                }
                Err(e) => format!("❌ I couldn't schedule that: {e}."),
            }
        }
        Err(e) => clarify_parse_failure(&e).to_string(),
    };

    new_message.reply(&ctx.http, reply).await?;
    Ok(())
}

/// Parse failures get a specific nudge instead of a generic error.
fn clarify_parse_failure(error: &ParseError) -> &'static str {
    match error {
        ParseError::NoTimeExpression => {
            "I can tell you want a reminder, but I couldn't find a time in there. \
             Try something like \"in 30 minutes\" or \"tomorrow at 3pm\"."
        }
        ParseError::PastTime => {
            "That time has already passed — give me a time that's still ahead of us."
        }
        ParseError::InvalidTimeValue => {
            "That doesn't look like a valid time. Try \"at 15:00\" or \"at 3pm\"."
        }
    }
}

async fn chat_with_llm(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
    prompt: &str,
) -> Result<(), Error> {
    let channel_id = new_message.channel_id.get();

    let system_prompt = format!(
        "{}\n\n{}",
        data.config.system_prompt,
        data.personality.prompt_fragment()
    );

    // The current message goes through the store so history and request
    // stay consistent.
    data.conversations
        .push_user(channel_id, &new_message.author.name, prompt);

    let mut messages: Vec<ChatCompletionRequestMessage> =
        vec![ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?
            .into()];
    messages.extend(data.conversations.messages_for(channel_id));

    let typing = new_message.channel_id.start_typing(&ctx.http);

    let agent = crate::llm::agent::Agent::new(data);
    let response = match agent.run(messages, 10).await {
        Ok(r) => r,
        Err(e) => {
            error!("Agent error handling mention: {}", e);
            format!("❌ Assistant Error: {}", e)
        }
    };

    drop(typing);

    data.conversations.push_assistant(channel_id, &response);

    for chunk in split_for_discord(&response) {
        new_message.reply(&ctx.http, chunk).await?;
    }

    Ok(())
}
