//! Reminder Scheduler.
//!
//! A single fixed tick computes the local hour and date, asks the store for
//! users due at that hour who have not fired today, records today's firing
//! for each and then fires them concurrently. The firing date is persisted
//! before the remote work starts, so a restart or an hour change never
//! produces a second reminder on the same day.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};

use crate::{
    aggregator::Aggregator,
    dispatch::Notifier,
    errors::{BotError, BotResult},
    models::{user::UserId, view::View},
    store::ReminderStore,
    time::{Clock, local_date, local_hour},
};

pub const DEFAULT_TICK: Duration = Duration::from_secs(60);
pub const DEFAULT_FIRING_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sent,
    Empty,
    Expired,
    Skipped,
    Failed,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: usize,
    pub sent: usize,
    pub empty: usize,
    pub expired: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TickReport {
    fn record(&mut self, outcome: Outcome) {
        self.fired += 1;
        match outcome {
            Outcome::Sent => self.sent += 1,
            Outcome::Empty => self.empty += 1,
            Outcome::Expired => self.expired += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

pub struct ReminderScheduler {
    aggregator: Arc<Aggregator>,
    reminders: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    firing_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        aggregator: Arc<Aggregator>,
        reminders: Arc<dyn ReminderStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aggregator,
            reminders,
            notifier,
            clock,
            firing_timeout: DEFAULT_FIRING_TIMEOUT,
        }
    }

    /// Upper bound on one user's firing, remote calls and dispatch included.
    pub fn with_firing_timeout(mut self, firing_timeout: Duration) -> Self {
        self.firing_timeout = firing_timeout;
        self
    }

    pub async fn tick(&self) -> BotResult<TickReport> {
        let now = self.clock.now();
        let hour = local_hour(now);
        let today = local_date(now);

        let mut claimed = Vec::new();
        for user in self.reminders.due_reminders(hour, today).await? {
            if self.reminders.claim_firing(user, today).await? {
                claimed.push(user);
            }
        }
        if claimed.is_empty() {
            return Ok(TickReport::default());
        }

        debug!(hour, %today, users = claimed.len(), "Firing reminders");
        let outcomes = join_all(claimed.iter().map(|&user| self.fire(user))).await;

        let mut report = TickReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }
        info!(?report, hour, "Reminder tick complete");
        Ok(report)
    }

    async fn fire(&self, user: UserId) -> Outcome {
        let result = match timeout(self.firing_timeout, self.aggregator.due_for_reminder(user)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(user_id = %user, "Reminder firing timed out, skipping until next cycle");
                return Outcome::Skipped;
            }
        };

        match result {
            Ok(view) if view.items.is_empty() => Outcome::Empty,
            Ok(view) => self.dispatch(user, View::Reminder(view), Outcome::Sent).await,
            Err(BotError::AuthExpired) => {
                self.dispatch(user, View::TokenExpired, Outcome::Expired).await
            }
            Err(BotError::RemoteUnavailable(reason)) => {
                warn!(user_id = %user, %reason, "LMS unavailable, skipping reminder until next cycle");
                Outcome::Skipped
            }
            Err(BotError::NotLinked) => Outcome::Skipped,
            Err(err) => {
                error!(user_id = %user, error = %err, "Reminder firing failed");
                Outcome::Failed
            }
        }
    }

    async fn dispatch(&self, user: UserId, view: View, outcome: Outcome) -> Outcome {
        match self.notifier.send(user, view).await {
            Ok(()) => outcome,
            Err(err) => {
                warn!(user_id = %user, error = %err, "Failed to deliver reminder");
                Outcome::Failed
            }
        }
    }

    /// Tick forever at `period`. Tick errors are logged, never fatal.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Reminder scheduler started");

        loop {
            ticker.tick().await;
            if let Err(err) = self.tick().await {
                error!(error = %err, "Reminder tick failed");
            }
        }
    }
}
