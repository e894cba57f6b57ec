use crate::config::{DISCORD_EMBED_LIMIT, DISCORD_MESSAGE_LIMIT};
use crate::{Context, Error};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
};
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};

/// Chat with the assistant
#[poise::command(slash_command)]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Your message to the assistant"] message: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let channel_id = ctx.channel_id().get();

    data.personality.record_interaction(&message);
    data.conversations
        .push_user(channel_id, &ctx.author().name, &message);

    let system_prompt = format!(
        "{}\n\n{}",
        data.config.system_prompt,
        data.personality.prompt_fragment()
    );
    let mut messages: Vec<ChatCompletionRequestMessage> =
        vec![ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?
            .into()];
    messages.extend(data.conversations.messages_for(channel_id));

    let response = match data.llm_client.chat(messages).await {
        Ok(r) => r,
        Err(e) => {
            ctx.say(format!("❌ LLM Error: {}", e)).await?;
            return Ok(());
        }
    };

    data.conversations.push_assistant(channel_id, &response);
    send_response(&ctx, &response).await?;

    Ok(())
}

/// Clear this channel's conversation history
#[poise::command(slash_command)]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    ctx.data().conversations.clear(ctx.channel_id().get());
    ctx.say("🗑️ Conversation history cleared!").await?;
    Ok(())
}

/// Show how much conversation history is held for this channel
#[poise::command(slash_command)]
pub async fn history(ctx: Context<'_>) -> Result<(), Error> {
    let (user_turns, assistant_turns) = ctx.data().conversations.stats(ctx.channel_id().get());
    ctx.say(format!(
        "📊 Conversation history:\n• User messages: {}\n• Assistant messages: {}\n• Max capacity: {} messages",
        user_turns,
        assistant_turns,
        ctx.data().config.max_context_messages
    ))
    .await?;
    Ok(())
}

/// Check that the bot is alive
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = std::time::Instant::now();
    let handle = ctx.say("🏓 Pong!").await?;
    let elapsed = started.elapsed().as_millis();
    handle
        .edit(
            ctx,
            poise::CreateReply::default().content(format!("🏓 Pong! Round-trip: {}ms", elapsed)),
        )
        .await?;
    Ok(())
}

/// Send response, using embeds for long messages
pub async fn send_response(ctx: &Context<'_>, content: &str) -> Result<(), Error> {
    if content.len() <= DISCORD_MESSAGE_LIMIT {
        ctx.say(content).await?;
    } else if content.len() <= DISCORD_EMBED_LIMIT {
        let embed = CreateEmbed::new()
            .title("🏝️ Skycord")
            .description(content)
            .color(0x5865F2)
            .footer(CreateEmbedFooter::new("Response was too long for a message"));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
    } else {
        let chunks = crate::discord_text::split_message(content, DISCORD_EMBED_LIMIT - 100);
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let embed = CreateEmbed::new()
                .title(format!("🏝️ Skycord (Part {}/{})", i + 1, total))
                .description(chunk)
                .color(0x5865F2);

            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }
    Ok(())
}
