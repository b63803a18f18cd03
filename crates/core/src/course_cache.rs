//! Per-user course snapshots. Entries never expire; `invalidate` is the only
//! way to drop one.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    errors::BotResult,
    lms::LmsApi,
    models::{course::CourseMap, user::{AccessToken, UserId}},
};

#[derive(Default)]
struct CacheState {
    entries: HashMap<UserId, Arc<CourseMap>>,
    generations: HashMap<UserId, u64>,
}

pub struct CourseCache {
    lms: Arc<dyn LmsApi>,
    state: RwLock<CacheState>,
}

impl CourseCache {
    pub fn new(lms: Arc<dyn LmsApi>) -> Self {
        Self {
            lms,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Cached mapping for `user`, fetched from the LMS on a miss.
    ///
    /// No lock is held across the remote call. A fetch that races with
    /// `invalidate` is returned to its caller but not stored.
    pub async fn get(&self, user: UserId, token: &AccessToken) -> BotResult<Arc<CourseMap>> {
        let generation = {
            let state = self.state.read().await;
            if let Some(map) = state.entries.get(&user) {
                return Ok(Arc::clone(map));
            }
            state.generations.get(&user).copied().unwrap_or(0)
        };

        let courses = self.lms.list_active_courses(token).await?;
        let map = Arc::new(CourseMap::new(courses));
        debug!(user_id = %user, courses = map.len(), "Cached course list");

        let mut state = self.state.write().await;
        if state.generations.get(&user).copied().unwrap_or(0) == generation {
            state.entries.insert(user, Arc::clone(&map));
        }
        Ok(map)
    }

    pub async fn invalidate(&self, user: UserId) {
        let mut state = self.state.write().await;
        state.entries.remove(&user);
        *state.generations.entry(user).or_insert(0) += 1;
    }

    pub async fn is_cached(&self, user: UserId) -> bool {
        self.state.read().await.entries.contains_key(&user)
    }
}
