//! Call session tracking and the screen-pop search pipeline.
//!
//! The phone system repeats update events for the same call; tracking by
//! composite call identity makes the search run once. A call stays tracked
//! across updates until the phone system announces its end (the only
//! removal path short of logout), and a search result that comes back for
//! an already-ended call is dropped rather than resurrecting it.

use tracing::{debug, info, warn};

use crate::contact::Contact;
use crate::error::Result;
use crate::orchestrator::core::CtiEngine;
use crate::orchestrator::types::{SearchOrigin, SearchOutcome};
use crate::toolkit::SearchRequest;
use crate::widget::{Call, WidgetEvent};

impl CtiEngine {
    /// Phone-system call update entry point
    ///
    /// Idempotent: duplicate updates for a tracked identity are no-ops.
    pub async fn on_call_updated(&self, call: Call) {
        let key = call.key();
        if self.active_calls.contains_key(&key) {
            debug!("duplicate update for call {}, already tracked", key);
            return;
        }
        self.active_calls.insert(key.clone(), call.clone());
        info!(
            "📞 tracking {} call {} with {}",
            call.direction_label(),
            key,
            call.party_number
        );

        match self.run_record_search(&call, SearchOrigin::FreshCall).await {
            Ok(outcome) => {
                // The call may have ended while the search was in flight;
                // its result must not resurrect it.
                if !self.active_calls.contains_key(&key) {
                    debug!("call {} ended mid-search, dropping result", key);
                    return;
                }
                match outcome {
                    SearchOutcome::Match { contacts } => {
                        info!("✅ {} record(s) matched for call {}", contacts.len(), key);
                        self.fire(WidgetEvent::CallInfo { call, contacts });
                    }
                    SearchOutcome::NoMatch { continuation } => {
                        self.enqueue_unmatched(call, continuation).await;
                    }
                }
            }
            Err(e) => {
                // Terminal for this event; the session stays usable.
                warn!("record search for call {} failed: {}", key, e);
            }
        }
    }

    /// Phone-system call end entry point
    pub async fn on_call_ended(&self, call: &Call) {
        let key = call.key();
        if self.active_calls.remove(&key).is_some() {
            info!("📞 call {} ended, no longer tracked", key);
        }
    }

    /// One CRM directory search for a call's party number
    ///
    /// The raw result map is split into candidate records and the deferred
    /// screen-pop payload; the toolkit's marker entry never counts as a
    /// match. Fresh arrivals also surface the softphone panel.
    pub(crate) async fn run_record_search(
        &self,
        call: &Call,
        origin: SearchOrigin,
    ) -> Result<SearchOutcome> {
        if origin == SearchOrigin::FreshCall && self.config.general.show_panel_on_call {
            if let Err(e) = self.toolkit.set_softphone_panel_visibility(true).await {
                warn!("could not show softphone panel: {}", e);
            }
        }

        let response = self
            .toolkit
            .search_and_screen_pop(SearchRequest::for_call(call))
            .await?;
        let (records, continuation) = response.split();

        if records.is_empty() {
            debug!("🔍 no record matches {} for call {}", call.party_number, call.key());
            Ok(SearchOutcome::NoMatch { continuation })
        } else {
            debug!(
                "🔍 {} record(s) match {} for call {}",
                records.len(),
                call.party_number,
                call.key()
            );
            let contacts = records.iter().map(Contact::from_record).collect();
            Ok(SearchOutcome::Match { contacts })
        }
    }
}
