use std::sync::Arc;

use duebot_core::{
    aggregator::Aggregator,
    course_cache::CourseCache,
    dispatch::Notifier,
    link::{LinkTokens, Linker},
    overlay::Overlay,
    store::{ReminderStore, UserStore},
    time::Clock,
};

/// Core services the command handlers call into.
pub struct BotServices {
    pub aggregator: Arc<Aggregator>,
    pub overlay: Arc<Overlay>,
    pub linker: Arc<Linker>,
    pub link_tokens: Arc<LinkTokens>,
    pub cache: Arc<CourseCache>,
    pub reminders: Arc<dyn ReminderStore>,
    pub users: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}
