use duebot_core::{errors::BotResult, link::LINK_TOKEN_TTL_SECONDS, models::user::UserId};
use tracing::info;

use crate::{config::BotConfig, services::BotServices};

/// Issue a one-time link to the web form where the token is entered.
pub async fn setup(services: &BotServices, config: &BotConfig, user: UserId) -> BotResult<String> {
    services.users.touch_user(user).await?;
    let link_token = services.link_tokens.issue(user).await;
    info!(user_id = %user, "Issued credential link");

    Ok(format!(
        "Open this link within {} minutes to link your Canvas account:\n{}\n\n\
         Create a token in Canvas under Account > Settings > New Access Token. \
         The link works once; run /setup again for a new one.",
        LINK_TOKEN_TTL_SECONDS / 60,
        config.link_url(&link_token)
    ))
}

pub async fn unlink(services: &BotServices, user: UserId, confirm: bool) -> BotResult<String> {
    if !confirm {
        return Ok(
            "Nothing removed. Run /unlink with confirm set to true to remove your Canvas token."
                .to_string(),
        );
    }
    services.linker.unlink(user).await?;
    Ok("Your Canvas token has been removed. Todos, notes and reminder settings are kept; \
        run /setup to link again."
        .to_string())
}
