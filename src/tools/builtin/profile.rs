use crate::db::Database;
use crate::hypixel::HypixelClient;
use crate::tools::{schema_of, typed_params, Tool};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize, JsonSchema)]
pub struct LinkAccountParams {
    /// Discord user id as a string
    pub discord_id: String,
    /// Minecraft username (case-insensitive)
    pub minecraft_username: String,
}

pub struct LinkMinecraftAccountTool {
    pub db: Database,
    pub hypixel: Arc<HypixelClient>,
}

#[async_trait]
impl Tool for LinkMinecraftAccountTool {
    fn name(&self) -> &str {
        "link_minecraft_account"
    }

    fn description(&self) -> &str {
        "Link a Discord user to their Minecraft account. Resolves the UUID via the Mojang \
         API and stores the link so Skyblock stats can be fetched later."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<LinkAccountParams>()
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let params: LinkAccountParams = typed_params(params)?;

        let Some(account) = self
            .hypixel
            .account_for_username(&params.minecraft_username)
            .await?
        else {
            return Ok(json!({
                "result": format!(
                    "No Minecraft account named '{}' exists.",
                    params.minecraft_username
                )
            }));
        };

        self.db
            .run_blocking({
                let discord_id = params.discord_id.clone();
                let account = account.clone();
                move |db| db.link_profile(&discord_id, &account.name, &account.id)
            })
            .await?;

        info!(
            "Linked Discord user {} to Minecraft account {}",
            params.discord_id, account.name
        );

        Ok(json!({
            "result": format!("Linked to Minecraft account {}.", account.name),
            "username": account.name,
            "uuid": account.id,
        }))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct CheckLinkStatusParams {
    /// Discord user id as a string
    pub discord_id: String,
}

pub struct CheckLinkStatusTool {
    pub db: Database,
}

#[async_trait]
impl Tool for CheckLinkStatusTool {
    fn name(&self) -> &str {
        "check_link_status"
    }

    fn description(&self) -> &str {
        "Check whether a Discord user has linked their Minecraft account. Returns the \
         linked username and UUID if available."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CheckLinkStatusParams>()
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let params: CheckLinkStatusParams = typed_params(params)?;

        let record = self
            .db
            .run_blocking(move |db| db.get_profile(&params.discord_id))
            .await?;

        match record {
            Some(record) => Ok(json!({
                "linked": true,
                "username": record.minecraft_username,
                "uuid": record.minecraft_uuid,
            })),
            None => Ok(json!({
                "linked": false,
                "result": "No Minecraft account is linked."
            })),
        }
    }
}
