use crate::db::Database;
use crate::hypixel::{self, skills, HypixelClient};
use crate::tools::{schema_of, typed_params, Tool};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize, JsonSchema)]
pub struct GetSkyblockStatsParams {
    /// Discord user id as a string
    pub discord_id: String,
}

pub struct GetSkyblockStatsTool {
    pub db: Database,
    pub hypixel: Arc<HypixelClient>,
}

#[async_trait]
impl Tool for GetSkyblockStatsTool {
    fn name(&self) -> &str {
        "get_skyblock_stats"
    }

    fn description(&self) -> &str {
        "Get Hypixel Skyblock statistics for a Discord user: skill levels, skill average, \
         profile name, and purse. The user must have linked their Minecraft account first \
         using link_minecraft_account."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<GetSkyblockStatsParams>()
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let params: GetSkyblockStatsParams = typed_params(params)?;
        let discord_id = params.discord_id;

        let record = self
            .db
            .run_blocking({
                let discord_id = discord_id.clone();
                move |db| db.get_profile(&discord_id)
            })
            .await?;

        let Some(record) = record else {
            return Ok(json!({
                "result": "No linked Minecraft account. Ask the user to link one first."
            }));
        };

        let Some(profile) = self.hypixel.active_profile(&record.minecraft_uuid).await? else {
            return Ok(json!({
                "result": format!("No Skyblock profiles found for {}.", record.minecraft_username)
            }));
        };

        let Some(member) = hypixel::member_data(&profile, &record.minecraft_uuid) else {
            return Ok(json!({
                "result": "The player's profile data is unavailable."
            }));
        };

        let analysis = skills::analyze_skills(member);
        Ok(json!({
            "result": skills::format_summary(hypixel::profile_name(&profile), member),
            "username": record.minecraft_username,
            "profile": hypixel::profile_name(&profile),
            "skill_average": analysis.skill_average,
        }))
    }
}
