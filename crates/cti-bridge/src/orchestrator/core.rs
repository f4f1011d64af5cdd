//! # CTI Engine
//!
//! The engine owns all session-scoped state (tracked calls, the
//! new-contact queue, the last-seen CRM URL, and every outstanding timer)
//! and exposes one entry point per inbound event. State lives behind
//! `Arc`s so spawned timers can call back into a cloned engine, the way
//! the rest of this codebase hands cloned handles to background tasks.
//!
//! Logout is the sole cancellation signal: [`reset_session`] synchronously
//! clears tracked calls, the queue, all poll timers, and the pending
//! queue-run timer, so a new login starts from empty state.
//!
//! [`reset_session`]: CtiEngine::reset_session

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CtiConfig;
use crate::error::Result;
use crate::queue::manager::ContactQueue;
use crate::toolkit::{CrmToolkit, ScreenPopTarget};
use crate::widget::{
    default_log_inputs, Call, CallKey, ClickToDialPayload, ContactSelectedPayload, WidgetEvent,
};

/// Central coordinator between the softphone widget and the CRM toolkit
///
/// Cheap to clone: every stateful field is shared.
#[derive(Clone)]
pub struct CtiEngine {
    /// Bridge configuration
    pub(crate) config: CtiConfig,

    /// CRM toolkit boundary
    pub(crate) toolkit: Arc<dyn CrmToolkit>,

    /// Outbound events to the softphone widget
    pub(crate) widget_tx: mpsc::UnboundedSender<WidgetEvent>,

    /// Calls currently in flight (searched, not yet ended)
    pub(crate) active_calls: Arc<DashMap<CallKey, Call>>,

    /// Pending new-contact entries
    pub(crate) queue: Arc<RwLock<ContactQueue>>,

    /// Last-seen CRM page URL
    pub(crate) current_url: Arc<RwLock<Option<String>>>,

    /// Re-search timers, at most one per call identity
    pub(crate) poll_tasks: Arc<Mutex<HashMap<CallKey, JoinHandle<()>>>>,

    /// Debounced queue-run timer
    pub(crate) queue_run_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

/// Snapshot of the engine's session state
#[derive(Debug, Clone)]
pub struct BridgeStats {
    /// Calls currently tracked
    pub active_calls: usize,
    /// Entries in the new-contact queue
    pub queued_contacts: usize,
    /// Queue entries whose modal has been opened
    pub opened_contacts: usize,
    /// Outstanding re-search timers
    pub poll_tasks: usize,
}

impl CtiEngine {
    /// Create an engine over a toolkit and a widget event channel
    pub fn new(
        config: CtiConfig,
        toolkit: Arc<dyn CrmToolkit>,
        widget_tx: mpsc::UnboundedSender<WidgetEvent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            toolkit,
            widget_tx,
            active_calls: Arc::new(DashMap::new()),
            queue: Arc::new(RwLock::new(ContactQueue::new())),
            current_url: Arc::new(RwLock::new(None)),
            poll_tasks: Arc::new(Mutex::new(HashMap::new())),
            queue_run_timer: Arc::new(Mutex::new(None)),
        })
    }

    /// Widget session logged in
    pub async fn on_logged_in(&self) {
        info!("🔐 widget session logged in");
        if let Err(e) = self.toolkit.enable_click_to_dial().await {
            warn!("could not enable click-to-dial: {}", e);
        }
        self.fire(WidgetEvent::Config {
            log_inputs: default_log_inputs(),
        });
    }

    /// Widget session logged out
    pub async fn on_logged_out(&self) {
        info!("🔐 widget session logged out, resetting session state");
        self.reset_session().await;
        if let Err(e) = self.toolkit.disable_click_to_dial().await {
            warn!("could not disable click-to-dial: {}", e);
        }
    }

    /// CRM click-to-dial request
    pub async fn on_click_to_dial(&self, payload: ClickToDialPayload) {
        debug!("☎️ click-to-dial {}", payload.number);
        self.fire(WidgetEvent::MakeCall {
            number: payload.number,
        });
    }

    /// The agent picked one of several matched contacts in the widget
    pub async fn on_contact_selected(&self, payload: ContactSelectedPayload) {
        debug!("👤 contact {} selected, popping record", payload.contact_id);
        if let Err(e) = self
            .toolkit
            .screen_pop(ScreenPopTarget::Record {
                record_id: payload.contact_id,
            })
            .await
        {
            warn!("screen-pop for selected contact failed: {}", e);
        }
    }

    /// Clear every piece of session-scoped state
    ///
    /// Tracked calls, queue entries, poll timers, the queue-run timer, and
    /// the last-seen URL; nothing leaks into the next login session.
    pub async fn reset_session(&self) {
        self.active_calls.clear();
        self.queue.write().await.clear();
        self.cancel_all_poll_tasks().await;
        {
            let mut timer = self.queue_run_timer.lock().await;
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
        *self.current_url.write().await = None;
        debug!("🧹 session state cleared");
    }

    /// Is a call identity currently tracked?
    pub fn is_tracked(&self, key: &CallKey) -> bool {
        self.active_calls.contains_key(key)
    }

    /// Is a call identity waiting in the new-contact queue?
    pub async fn is_queued(&self, key: &CallKey) -> bool {
        self.queue.read().await.contains(key)
    }

    /// Snapshot current session state
    pub async fn stats(&self) -> BridgeStats {
        let queue = self.queue.read().await;
        BridgeStats {
            active_calls: self.active_calls.len(),
            queued_contacts: queue.len(),
            opened_contacts: queue.opened_count(),
            poll_tasks: self.poll_tasks.lock().await.len(),
        }
    }

    /// Push an event to the widget
    pub(crate) fn fire(&self, event: WidgetEvent) {
        if self.widget_tx.send(event).is_err() {
            warn!("widget event channel closed, dropping event");
        }
    }

    /// Install a poll task for a call identity, aborting any predecessor
    pub(crate) async fn replace_poll_task(&self, key: CallKey, handle: JoinHandle<()>) {
        let mut tasks = self.poll_tasks.lock().await;
        if let Some(previous) = tasks.insert(key, handle) {
            previous.abort();
        }
    }

    /// Drop a finished poll task's handle without aborting it
    pub(crate) async fn clear_poll_task(&self, key: &CallKey) {
        self.poll_tasks.lock().await.remove(key);
    }

    /// Abort and drop the poll task for a call identity
    pub(crate) async fn cancel_poll_task(&self, key: &CallKey) {
        if let Some(handle) = self.poll_tasks.lock().await.remove(key) {
            handle.abort();
        }
    }

    /// Abort and drop every poll task
    pub(crate) async fn cancel_all_poll_tasks(&self) {
        let mut tasks = self.poll_tasks.lock().await;
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}
