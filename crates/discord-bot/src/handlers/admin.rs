use duebot_core::{
    errors::{BotError, BotResult},
    models::{user::UserId, view::View},
};
use futures::future::join_all;
use tracing::{info, warn};

use super::options::Options;
use crate::{auth::verify_password, config::BotConfig, render, services::BotServices};

/// Anyone who is not the configured admin, or who gets the password wrong,
/// sees the same reply as for an unknown command.
pub fn authorize(config: &BotConfig, user: UserId, password: &str) -> BotResult<()> {
    let allowed = config.admin_user_id == Some(user.0)
        && config
            .admin_password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(hash, password));
    if allowed {
        Ok(())
    } else {
        warn!(user_id = %user, "Rejected admin command");
        Err(BotError::NotFound("Command".to_string()))
    }
}

/// Handle the /admin command
pub async fn handle(
    services: &BotServices,
    config: &BotConfig,
    user: UserId,
    (subcommand, options): (&str, Options<'_>),
) -> BotResult<String> {
    authorize(config, user, options.require_string("password")?)?;
    match subcommand {
        "stats" => stats(services).await,
        "broadcast" => broadcast(services, options.require_string("message")?).await,
        "purge" => purge(services, options.require_string("user")?).await,
        other => Err(BotError::NotFound(format!("Subcommand {other}"))),
    }
}

pub async fn stats(services: &BotServices) -> BotResult<String> {
    let stats = services.users.stats().await?;
    Ok(render::render_stats(&stats))
}

/// Send `message` to every known user and report how many deliveries failed.
pub async fn broadcast(services: &BotServices, message: &str) -> BotResult<String> {
    let message = message.trim();
    if message.is_empty() {
        return Err(BotError::Validation("Message can't be empty.".to_string()));
    }

    let users = services.users.all_users().await?;
    let results = join_all(users.iter().map(|user| {
        services
            .notifier
            .send(*user, View::Broadcast(message.to_string()))
    }))
    .await;

    let sent = results.iter().filter(|r| r.is_ok()).count();
    let failed = results.len() - sent;
    info!(sent, failed, "Broadcast finished");
    Ok(format!("Broadcast complete: {sent} sent, {failed} failed."))
}

/// Hard delete of one user's records.
pub async fn purge(services: &BotServices, target: &str) -> BotResult<String> {
    let target = target
        .trim()
        .parse::<u64>()
        .map(UserId)
        .map_err(|_| BotError::Validation("User id must be a number.".to_string()))?;

    services.users.purge(target).await?;
    services.cache.invalidate(target).await;
    info!(user_id = %target, "Purged user records");
    Ok(format!("All records for user {target} deleted."))
}
