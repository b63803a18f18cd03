use async_trait::async_trait;
use mockall::automock;

use crate::{
    errors::BotResult,
    models::{user::UserId, view::View},
};

/// Pushes a view to a user outside of a command reply. Rendering to platform
/// markup happens on the implementation side.
#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user: UserId, view: View) -> BotResult<()>;
}
