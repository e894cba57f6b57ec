use crate::hypixel::{self, skills};
use crate::{Context, Error};

/// Show Skyblock stats for your linked account
#[poise::command(slash_command)]
pub async fn skyblock(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let discord_id = ctx.author().id.to_string();
    let record = data
        .db
        .run_blocking(move |db| db.get_profile(&discord_id))
        .await?;

    let Some(record) = record else {
        ctx.say("❌ No linked Minecraft account. Use `/link <username>` first.")
            .await?;
        return Ok(());
    };

    let profile = match data.hypixel.active_profile(&record.minecraft_uuid).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            ctx.say(format!(
                "❌ No Skyblock profiles found for **{}**.",
                record.minecraft_username
            ))
            .await?;
            return Ok(());
        }
        Err(e) => {
            ctx.say(format!("❌ Couldn't fetch Skyblock data: {e}")).await?;
            return Ok(());
        }
    };

    let Some(member) = hypixel::member_data(&profile, &record.minecraft_uuid) else {
        ctx.say("❌ The profile data for your account is unavailable.")
            .await?;
        return Ok(());
    };

    ctx.say(skills::format_summary(
        hypixel::profile_name(&profile),
        member,
    ))
    .await?;
    Ok(())
}
