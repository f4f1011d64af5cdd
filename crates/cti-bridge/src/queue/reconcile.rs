//! Navigation-driven reconciliation.
//!
//! The toolkit never confirms whether a "create new record" modal ended in a
//! save or a cancel; the only observable signals are the page-navigation
//! stream and the record metadata it sometimes carries. Leaving a modal for
//! the page recorded beneath it reads as a cancel; leaving it for a page
//! that names a record reads as a save. Either way, the remaining opened
//! entries are re-polled and the next queued entry is promoted after a
//! settle delay.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::contact::{format_record_name, Contact};
use crate::navigation;
use crate::orchestrator::core::CtiEngine;
use crate::queue::manager::PendingContact;
use crate::toolkit::ScreenPopTarget;
use crate::widget::{Call, CallKey, NavigationPayload, WidgetEvent};

impl CtiEngine {
    /// CRM page-navigation event entry point
    pub async fn on_navigation_changed(&self, nav: NavigationPayload) {
        // Idempotence guard: the stream fires duplicates with no page change.
        let previous = {
            let mut current = self.current_url.write().await;
            if let Some(seen) = current.as_deref() {
                if navigation::is_same_url(seen, &nav.url) {
                    return;
                }
            }
            current.replace(nav.url.clone())
        };

        if self.queue.read().await.is_empty() {
            return;
        }
        // Mid-transition: the new page is itself a new-record modal.
        if navigation::is_new_record_modal(&nav.url, &self.config.navigation) {
            return;
        }
        // Unrelated navigation: we were not on a new-record modal before.
        let Some(previous) = previous else {
            return;
        };
        if !navigation::is_new_record_modal(&previous, &self.config.navigation) {
            return;
        }

        let background = navigation::background_context_path(&previous, &self.config.navigation);
        let landed = navigation::url_path(&nav.url);
        let returned_to_background = background.as_deref() == Some(landed.as_str());

        let resolved = { self.queue.write().await.take_current() };
        let resolved_number = resolved.as_ref().map(|e| e.call.party_number.clone());

        if let Some(entry) = resolved {
            self.resolve_current_entry(entry, &nav, returned_to_background)
                .await;
        }

        self.restart_polls(resolved_number.as_deref()).await;
        self.schedule_run_queue().await;
    }

    /// Close out the entry whose modal we just left
    async fn resolve_current_entry(
        &self,
        entry: PendingContact,
        nav: &NavigationPayload,
        returned_to_background: bool,
    ) {
        let key = entry.key();
        self.cancel_poll_task(&key).await;

        if returned_to_background {
            info!("❎ new-record modal cancelled for call {}", key);
            return;
        }

        if let Some(record_id) = nav.record_id.clone() {
            let record_type = nav.object_type.clone().unwrap_or_default();
            let contact = Contact {
                name: format_record_name(
                    nav.record_name.as_deref().unwrap_or_default(),
                    &record_type,
                ),
                id: record_id,
                record_type,
            };
            info!("✅ new record {} saved for call {}", contact.id, key);
            self.fire(WidgetEvent::CallInfo {
                call: entry.call,
                contacts: vec![contact],
            });
            return;
        }

        // Landed somewhere that is neither the background page nor a record
        // page: treated as a cancel. A genuine save is still caught by the
        // re-search pass that follows.
        debug!("modal for call {} closed without record metadata, treating as cancel", key);
    }

    /// Restart bounded re-search for every still-open queued entry
    ///
    /// The entry whose party number matches the just-resolved call gets the
    /// focused schedule to catch CRM indexing lag on the fresh record.
    async fn restart_polls(&self, resolved_number: Option<&str>) {
        let targets: Vec<(CallKey, bool)> = {
            let queue = self.queue.read().await;
            queue
                .entries()
                .filter(|e| e.opened)
                .map(|e| {
                    let focused = resolved_number == Some(e.call.party_number.as_str());
                    (e.key(), focused)
                })
                .collect()
        };
        for (key, focused) in targets {
            let schedule = if focused {
                self.config.polling.focused_schedule()
            } else {
                self.config.polling.default_schedule()
            };
            self.start_repoll(key, schedule).await;
        }
    }

    /// Queue a call whose search found no record
    ///
    /// Opens its modal immediately when no other modal is on screen and the
    /// agent is not already sitting on a new-record page; otherwise the
    /// entry waits for [`run_queue`](Self::run_queue).
    pub(crate) async fn enqueue_unmatched(
        &self,
        call: Call,
        continuation: Option<serde_json::Value>,
    ) {
        let key = call.key();
        let Some(continuation) = continuation else {
            warn!("no deferred screen-pop payload for unmatched call {}, cannot queue", key);
            return;
        };

        let on_modal = {
            let url = self.current_url.read().await;
            url.as_deref()
                .map(|u| navigation::is_new_record_modal(u, &self.config.navigation))
                .unwrap_or(false)
        };

        let popped = {
            let mut queue = self.queue.write().await;
            if !queue.push(PendingContact::new(call, continuation)) {
                return;
            }
            if !queue.has_current() && !on_modal {
                queue.promote(&key)
            } else {
                debug!("📋 suppressing screen-pop for call {} (a modal is busy)", key);
                None
            }
        };

        if let Some(continuation) = popped {
            info!("📋 opening new-record modal for call {}", key);
            if let Err(e) = self
                .toolkit
                .screen_pop(ScreenPopTarget::Deferred(continuation))
                .await
            {
                warn!("screen-pop for call {} failed: {}", key, e);
            }
        }
    }

    /// Promote the oldest not-yet-opened entry and open its modal
    pub(crate) async fn run_queue(&self) {
        let promoted = { self.queue.write().await.promote_next() };
        let Some((key, continuation)) = promoted else {
            return;
        };
        info!("📋 opening new-record modal for queued call {}", key);
        if let Err(e) = self
            .toolkit
            .screen_pop(ScreenPopTarget::Deferred(continuation))
            .await
        {
            warn!("screen-pop for queued call {} failed: {}", key, e);
        }
    }

    /// Debounced [`run_queue`](Self::run_queue): waits out the CRM's own
    /// post-modal navigation before presenting the next modal
    pub(crate) async fn schedule_run_queue(&self) {
        let delay = Duration::from_millis(self.config.general.queue_run_delay_ms);
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.run_queue().await;
        });
        let mut timer = self.queue_run_timer.lock().await;
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }
}
