pub mod skills;

use anyhow::Context as AnyhowContext;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const HYPIXEL_BASE_URL: &str = "https://api.hypixel.net/v2";
const MOJANG_PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

/// A Mojang account resolved from a username.
#[derive(Debug, Clone, Deserialize)]
pub struct MojangAccount {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct SkyblockProfilesResponse {
    success: bool,
    #[serde(default)]
    profiles: Option<Vec<Value>>,
    #[serde(default)]
    cause: Option<String>,
}

/// Client for the Mojang and Hypixel HTTP APIs.
pub struct HypixelClient {
    http: Client,
    api_key: Option<String>,
}

impl HypixelClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    /// Resolve a Minecraft username to its account. `None` means the name
    /// doesn't exist, which is a normal outcome, not an error.
    pub async fn account_for_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<MojangAccount>> {
        let url = format!("{}/{}", MOJANG_PROFILE_URL, username);
        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status => anyhow::bail!("Mojang API returned {status} for username lookup"),
        }
    }

    /// All Skyblock profiles the player is a member of. Profiles are deeply
    /// nested and version-drifting, so they stay as raw JSON; the pieces we
    /// understand are picked out by the helpers below.
    pub async fn skyblock_profiles(&self, uuid: &str) -> anyhow::Result<Vec<Value>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("HYPIXEL_API_KEY is not configured")?;

        let response = self
            .http
            .get(format!("{}/skyblock/profiles", HYPIXEL_BASE_URL))
            .query(&[("key", api_key), ("uuid", uuid)])
            .send()
            .await?
            .error_for_status()?;

        let body: SkyblockProfilesResponse = response.json().await?;
        if !body.success {
            anyhow::bail!(
                "Hypixel API request failed: {}",
                body.cause.unwrap_or_else(|| "unknown cause".to_string())
            );
        }

        let profiles = body.profiles.unwrap_or_default();
        debug!("Fetched {} Skyblock profiles for {}", profiles.len(), uuid);
        Ok(profiles)
    }

    /// The profile with the most recent save for this player.
    pub async fn active_profile(&self, uuid: &str) -> anyhow::Result<Option<Value>> {
        let profiles = self.skyblock_profiles(uuid).await?;
        Ok(pick_active_profile(&profiles, uuid).cloned())
    }
}

/// Select the member's most recently saved profile.
pub fn pick_active_profile<'a>(profiles: &'a [Value], uuid: &str) -> Option<&'a Value> {
    let mut active: Option<&Value> = None;
    let mut latest_save = 0u64;

    for profile in profiles {
        let Some(member) = member_data(profile, uuid) else {
            continue;
        };
        let last_save = member
            .get("last_save")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if active.is_none() || last_save > latest_save {
            latest_save = last_save;
            active = Some(profile);
        }
    }

    active
}

/// This player's slice of a profile.
pub fn member_data<'a>(profile: &'a Value, uuid: &str) -> Option<&'a Value> {
    profile.get("members")?.get(uuid)
}

pub fn profile_name(profile: &Value) -> &str {
    profile
        .get("cute_name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(name: &str, uuid: &str, last_save: u64) -> Value {
        json!({
            "cute_name": name,
            "members": {
                uuid: { "last_save": last_save }
            }
        })
    }

    #[test]
    fn picks_the_most_recently_saved_profile() {
        let profiles = vec![
            profile("Apple", "u1", 100),
            profile("Banana", "u1", 300),
            profile("Cherry", "u1", 200),
        ];
        let active = pick_active_profile(&profiles, "u1").unwrap();
        assert_eq!(profile_name(active), "Banana");
    }

    #[test]
    fn ignores_profiles_the_player_is_not_in() {
        let profiles = vec![profile("Apple", "someone-else", 500), profile("Banana", "u1", 10)];
        let active = pick_active_profile(&profiles, "u1").unwrap();
        assert_eq!(profile_name(active), "Banana");
    }

    #[test]
    fn no_membership_means_no_active_profile() {
        let profiles = vec![profile("Apple", "someone-else", 500)];
        assert!(pick_active_profile(&profiles, "u1").is_none());
    }

    #[test]
    fn profiles_without_last_save_still_qualify() {
        let profiles = vec![json!({
            "cute_name": "Date",
            "members": { "u1": {} }
        })];
        let active = pick_active_profile(&profiles, "u1").unwrap();
        assert_eq!(profile_name(active), "Date");
    }
}
