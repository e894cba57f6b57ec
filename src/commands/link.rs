use crate::{Context, Error};
use tracing::info;

/// Link your Minecraft account
#[poise::command(slash_command)]
pub async fn link(
    ctx: Context<'_>,
    #[description = "Your Minecraft username"] username: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let account = match data.hypixel.account_for_username(username.trim()).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            ctx.say(format!("❌ No Minecraft account named `{}` exists.", username))
                .await?;
            return Ok(());
        }
        Err(e) => {
            ctx.say(format!("❌ Couldn't reach the Mojang API: {e}")).await?;
            return Ok(());
        }
    };

    let discord_id = ctx.author().id.to_string();
    data.db
        .run_blocking({
            let account = account.clone();
            move |db| db.link_profile(&discord_id, &account.name, &account.id)
        })
        .await?;

    info!(
        "Linked Discord user {} to Minecraft account {}",
        ctx.author().id,
        account.name
    );
    ctx.say(format!("✅ Linked to Minecraft account **{}**.", account.name))
        .await?;
    Ok(())
}

/// Unlink your Minecraft account
#[poise::command(slash_command)]
pub async fn unlink(ctx: Context<'_>) -> Result<(), Error> {
    let discord_id = ctx.author().id.to_string();
    let removed = ctx
        .data()
        .db
        .run_blocking(move |db| db.unlink_profile(&discord_id))
        .await?;

    if removed == 0 {
        ctx.say("❌ You don't have a linked Minecraft account.").await?;
    } else {
        ctx.say("✅ Minecraft account unlinked.").await?;
    }
    Ok(())
}
