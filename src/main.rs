use poise::serenity_prelude as serenity;
use skycord::commands::{chat, link, reminder, stats};
use skycord::delivery::{log_delivery_failure, DiscordDeliver};
use skycord::{config::Config, Data};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                chat::chat(),
                chat::clear(),
                chat::history(),
                chat::ping(),
                reminder::reminder(),
                link::link(),
                link::unlink(),
                stats::skyblock(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        if !new_message.author.bot && is_addressed(new_message, data.bot_id) {
                            if let Err(e) =
                                skycord::mention::handle_mention(ctx, new_message, data).await
                            {
                                error!("Failed to handle mention: {}", e);
                            }
                        }
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let llm_client = skycord::llm::LlmClient::new(&config);
                let db = skycord::db::Database::new(&config).expect("Failed to open database");
                db.execute_init().expect("Failed to initialize database");
                let hypixel = Arc::new(skycord::hypixel::HypixelClient::new(
                    config.hypixel_api_key.clone(),
                ));

                let conversations =
                    skycord::context::ConversationStore::new(config.max_context_messages);
                let rate_limiter = skycord::rate_limit::RateLimiter::new(
                    config.rate_limit_messages,
                    config.rate_limit_secs,
                );
                let personality = skycord::personality::PersonalityTracker::new();

                let parser = skycord::reminders::TimeParser::new(&config.reminders);
                let scheduler = Arc::new(skycord::reminders::ReminderScheduler::new(
                    Arc::new(skycord::reminders::SystemClock),
                    config.reminders.max_lead_days,
                    Arc::new(log_delivery_failure),
                ));
                let deliver: Arc<dyn skycord::reminders::Deliver> =
                    Arc::new(DiscordDeliver::new(ctx.http.clone()));

                let mut tools = skycord::tools::ToolRegistry::new();
                tools.register(Arc::new(skycord::tools::builtin::GetSkyblockStatsTool {
                    db: db.clone(),
                    hypixel: hypixel.clone(),
                }));
                tools.register(Arc::new(skycord::tools::builtin::LinkMinecraftAccountTool {
                    db: db.clone(),
                    hypixel: hypixel.clone(),
                }));
                tools.register(Arc::new(skycord::tools::builtin::CheckLinkStatusTool {
                    db: db.clone(),
                }));
                tools.register(Arc::new(skycord::tools::builtin::CreateReminderTool {
                    scheduler: scheduler.clone(),
                    deliver: deliver.clone(),
                }));

                Ok(Data {
                    config,
                    llm_client,
                    db,
                    hypixel,
                    conversations,
                    rate_limiter,
                    personality,
                    tools: Arc::new(tools),
                    parser,
                    scheduler,
                    deliver,
                    bot_id: ready.user.id.get(),
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

/// The bot responds to direct messages and to messages that mention it.
fn is_addressed(message: &serenity::Message, bot_id: u64) -> bool {
    message.guild_id.is_none() || message.mentions_user_id(serenity::UserId::new(bot_id))
}
