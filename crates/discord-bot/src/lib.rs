use std::sync::Arc;

use eyre::Result;
use serenity::{Client, prelude::GatewayIntents};
use tracing::info;

pub mod auth;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod notifier;
pub mod render;
pub mod services;

use services::BotServices;

/// Start the Discord bot and run until the gateway connection ends.
///
/// Slash commands only, so the non-privileged intents are enough.
pub async fn start_bot(config: config::BotConfig, services: Arc<BotServices>) -> Result<()> {
    info!("Starting Discord bot");

    let handler = handlers::Handler::new(config.clone(), services);
    let mut client = Client::builder(&config.token, GatewayIntents::non_privileged())
        .application_id(config.application_id)
        .event_handler(handler)
        .await?;

    info!("Connecting to Discord...");
    client.start().await?;

    Ok(())
}
