use eyre::{Result, eyre};
use serde::Deserialize;
use std::env;

/// Configuration for the Discord bot.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Discord bot token (required)
    pub token: String,
    /// Application ID for Discord bot (required)
    pub application_id: u64,
    /// Test guild ID for faster command registration during development
    pub test_guild_id: Option<u64>,
    /// Discord user allowed to run `/admin`
    pub admin_user_id: Option<u64>,
    /// Argon2 PHC string the `/admin` password is checked against
    pub admin_password_hash: Option<String>,
    /// Public base URL of the link web server
    pub link_base_url: String,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let token = env::var("DISCORD_TOKEN")
            .map_err(|_| eyre!("DISCORD_TOKEN environment variable not set"))?;

        let application_id = env::var("DISCORD_APPLICATION_ID")
            .map_err(|_| eyre!("DISCORD_APPLICATION_ID environment variable not set"))?
            .parse::<u64>()
            .map_err(|_| eyre!("DISCORD_APPLICATION_ID must be a valid u64"))?;

        // Optional test guild ID for development
        let test_guild_id = env::var("DISCORD_TEST_GUILD_ID")
            .ok()
            .and_then(|id| id.parse::<u64>().ok());

        let admin_user_id = match env::var("ADMIN_USER_ID") {
            Ok(id) => Some(
                id.parse::<u64>()
                    .map_err(|_| eyre!("ADMIN_USER_ID must be a valid u64"))?,
            ),
            Err(_) => None,
        };
        let admin_password_hash = env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty());

        let link_base_url = env::var("LINK_BASE_URL")
            .map_err(|_| eyre!("LINK_BASE_URL environment variable not set"))?
            .trim()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            token,
            application_id,
            test_guild_id,
            admin_user_id,
            admin_password_hash,
            link_base_url,
        })
    }

    /// Web page where `link_token` can be redeemed.
    pub fn link_url(&self, link_token: &str) -> String {
        format!("{}/link?token={}", self.link_base_url, link_token)
    }

    /// Admin commands need both an admin id and a password hash.
    pub fn admin_enabled(&self) -> bool {
        self.admin_user_id.is_some() && self.admin_password_hash.is_some()
    }
}
