//! Credential linking: one-time web link tokens and the link/unlink flow.

use std::{collections::HashMap, sync::Arc};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, rngs::OsRng};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    course_cache::CourseCache,
    dispatch::Notifier,
    errors::{BotError, BotResult},
    lms::{LmsApi, LmsError},
    models::{
        course::CourseMap,
        user::{AccessToken, UserId},
        view::View,
    },
    store::{CredentialStore, ReminderStore, UserStore},
    time::Clock,
};

pub const LINK_TOKEN_TTL_SECONDS: i64 = 300;
pub const MIN_ACCESS_TOKEN_LENGTH: usize = 10;
const LINK_TOKEN_BYTES: usize = 32;

struct Pending {
    user: UserId,
    expires_at: DateTime<Utc>,
}

/// Single-use tokens that let a user open the web form without typing a
/// secret into chat. Issuing a new token revokes the user's earlier ones.
pub struct LinkTokens {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    pending: Mutex<HashMap<String, Pending>>,
}

impl LinkTokens {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ttl: Duration::seconds(LINK_TOKEN_TTL_SECONDS),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub async fn issue(&self, user: UserId) -> String {
        let now = self.clock.now();
        let token = generate_token();
        let mut pending = self.pending.lock().await;
        pending.retain(|_, p| p.user != user && p.expires_at > now);
        pending.insert(
            token.clone(),
            Pending {
                user,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Owner of a live token, without consuming it.
    pub async fn peek(&self, token: &str) -> Option<UserId> {
        let now = self.clock.now();
        self.pending
            .lock()
            .await
            .get(token)
            .filter(|p| p.expires_at > now)
            .map(|p| p.user)
    }

    /// Owner of a live token. The token is gone afterwards either way.
    pub async fn consume(&self, token: &str) -> Option<UserId> {
        let now = self.clock.now();
        self.pending
            .lock()
            .await
            .remove(token)
            .filter(|p| p.expires_at > now)
            .map(|p| p.user)
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; LINK_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct Linker {
    lms: Arc<dyn LmsApi>,
    credentials: Arc<dyn CredentialStore>,
    reminders: Arc<dyn ReminderStore>,
    users: Arc<dyn UserStore>,
    cache: Arc<CourseCache>,
    notifier: Arc<dyn Notifier>,
}

impl Linker {
    pub fn new(
        lms: Arc<dyn LmsApi>,
        credentials: Arc<dyn CredentialStore>,
        reminders: Arc<dyn ReminderStore>,
        users: Arc<dyn UserStore>,
        cache: Arc<CourseCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            lms,
            credentials,
            reminders,
            users,
            cache,
            notifier,
        }
    }

    /// Validate `token` against the LMS and store it, replacing any previous
    /// credential. Returns the number of active courses found.
    pub async fn link(&self, user: UserId, token: &str) -> BotResult<usize> {
        let token = token.trim();
        if token.len() < MIN_ACCESS_TOKEN_LENGTH {
            return Err(BotError::Validation(
                "That doesn't look like a valid Canvas token.".to_string(),
            ));
        }
        let token = AccessToken::new(token);

        let courses = self.lms.list_active_courses(&token).await.map_err(|err| match err {
            LmsError::AuthExpired => BotError::Validation(
                "Canvas rejected this token. Check that you copied it correctly.".to_string(),
            ),
            other => other.into(),
        })?;
        let course_count = CourseMap::new(courses).len();

        self.users.touch_user(user).await?;
        self.credentials.put(user, &token).await?;
        self.reminders.ensure_default_reminder(user).await?;
        self.cache.invalidate(user).await;
        info!(user_id = %user, course_count, "Linked LMS credential");

        if let Err(err) = self.notifier.send(user, View::Linked { course_count }).await {
            warn!(user_id = %user, error = %err, "Could not confirm link in chat");
        }
        Ok(course_count)
    }

    /// Revoke the credential. Todos, notes and reminder settings stay.
    pub async fn unlink(&self, user: UserId) -> BotResult<()> {
        if !self.credentials.revoke(user).await? {
            return Err(BotError::NotLinked);
        }
        self.cache.invalidate(user).await;
        info!(user_id = %user, "Unlinked LMS credential");
        Ok(())
    }
}
