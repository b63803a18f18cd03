use std::sync::Arc;

use async_trait::async_trait;
use duebot_core::{
    dispatch::Notifier,
    errors::{BotError, BotResult},
    models::{user::UserId, view::View},
};
use serenity::{http::Http, model::id::UserId as DiscordUserId};
use tracing::debug;

use crate::render;

/// Delivers core views as Discord direct messages.
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, user: UserId, view: View) -> BotResult<()> {
        let text = render::render_view(&view);
        let channel = DiscordUserId(user.0)
            .create_dm_channel(self.http.as_ref())
            .await
            .map_err(|e| BotError::RemoteUnavailable(format!("could not open DM channel: {e}")))?;
        channel
            .id
            .send_message(&self.http, |m| m.content(text))
            .await
            .map_err(|e| BotError::RemoteUnavailable(format!("could not send DM: {e}")))?;
        debug!(user_id = %user, "Delivered direct message");
        Ok(())
    }
}
