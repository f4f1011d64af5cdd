//! Bounded re-search polling.
//!
//! No "record was saved" event exists, so timers stand in for it: each
//! still-open queue entry is re-searched on an interval until it matches or
//! its attempt budget runs out. The primitive is explicit (interval + max
//! attempts) so it can be driven deterministically under paused time.

use tracing::{debug, warn};

use crate::orchestrator::core::CtiEngine;
use crate::orchestrator::types::{SearchOrigin, SearchOutcome};
use crate::widget::{CallKey, WidgetEvent};

/// One bounded re-search cycle: `max_attempts` polls, `interval` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: std::time::Duration,
    pub max_attempts: u32,
}

/// Outcome of a single poll tick
pub(crate) enum PollTick {
    /// The entry matched (or was otherwise resolved); stop polling
    Resolved,
    /// Still no match; keep polling
    Pending,
    /// The entry is no longer queued; stop polling
    Gone,
}

impl CtiEngine {
    /// Start (or restart) the re-search cycle for a queued entry
    ///
    /// Replaces any cycle already running for the same call identity: at
    /// most one timer per identity.
    pub(crate) async fn start_repoll(&self, key: CallKey, schedule: PollSchedule) {
        let engine = self.clone();
        let poll_key = key.clone();
        let handle = tokio::spawn(async move {
            for attempt in 1..=schedule.max_attempts {
                tokio::time::sleep(schedule.interval).await;
                match engine.repoll_entry(&poll_key).await {
                    PollTick::Resolved | PollTick::Gone => return,
                    PollTick::Pending => {
                        debug!("🔁 re-search {}/{} for call {} found no record",
                               attempt, schedule.max_attempts, poll_key);
                    }
                }
            }
            engine.abandon_entry(&poll_key).await;
        });
        self.replace_poll_task(key, handle).await;
    }

    /// One re-search for a queued entry
    pub(crate) async fn repoll_entry(&self, key: &CallKey) -> PollTick {
        let call = {
            let queue = self.queue.read().await;
            queue.get(key).map(|entry| entry.call.clone())
        };
        let Some(call) = call else {
            return PollTick::Gone;
        };

        match self.run_record_search(&call, SearchOrigin::Requeue).await {
            Ok(SearchOutcome::Match { contacts }) => {
                let removed = self.queue.write().await.remove(key);
                if removed.is_some() {
                    debug!("✅ record appeared for queued call {}, resolving entry", key);
                    self.fire(WidgetEvent::CallInfo { call, contacts });
                }
                self.clear_poll_task(key).await;
                PollTick::Resolved
            }
            Ok(SearchOutcome::NoMatch { .. }) => PollTick::Pending,
            Err(e) => {
                // A failed poll burns the attempt; the budget still bounds us.
                warn!("re-search for call {} failed: {}", key, e);
                PollTick::Pending
            }
        }
    }

    /// Give up on an entry whose attempt budget is exhausted
    async fn abandon_entry(&self, key: &CallKey) {
        if self.queue.write().await.remove(key).is_some() {
            debug!("⌛ re-search budget exhausted for call {}, dropping entry", key);
        }
        self.clear_poll_task(key).await;
    }
}
