use duebot_core::{
    errors::{BotError, BotResult},
    models::user::{DEFAULT_REMINDER_HOUR, UserId},
};
use tracing::info;

use super::options::Options;
use crate::{render, services::BotServices};

/// Handle the /reminder command
pub async fn handle(
    services: &BotServices,
    user: UserId,
    (subcommand, options): (&str, Options<'_>),
) -> BotResult<String> {
    match subcommand {
        "show" => show(services, user).await,
        "set" => set(services, user, options.require_integer("hour")?).await,
        "off" => off(services, user).await,
        other => Err(BotError::NotFound(format!("Subcommand {other}"))),
    }
}

pub async fn show(services: &BotServices, user: UserId) -> BotResult<String> {
    let setting = services.reminders.reminder(user).await?;
    Ok(render::render_reminder_setting(setting.as_ref()))
}

pub async fn set(services: &BotServices, user: UserId, hour: i64) -> BotResult<String> {
    let hour = u8::try_from(hour)
        .ok()
        .filter(|h| *h <= 23)
        .ok_or_else(|| BotError::Validation("Hour must be between 0 and 23.".to_string()))?;

    services.users.touch_user(user).await?;
    let setting = services.reminders.set_reminder(user, hour, true).await?;
    info!(user_id = %user, hour, "Reminder set");
    Ok(render::render_reminder_setting(Some(&setting)))
}

/// Keeps the stored hour so turning it back on is one step.
pub async fn off(services: &BotServices, user: UserId) -> BotResult<String> {
    let hour = services
        .reminders
        .reminder(user)
        .await?
        .map(|s| s.hour)
        .unwrap_or(DEFAULT_REMINDER_HOUR);

    services.users.touch_user(user).await?;
    let setting = services.reminders.set_reminder(user, hour, false).await?;
    info!(user_id = %user, "Reminder turned off");
    Ok(render::render_reminder_setting(Some(&setting)))
}
