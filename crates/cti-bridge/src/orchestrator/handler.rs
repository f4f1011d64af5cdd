//! Event bridge: inbound event dispatch.
//!
//! Every widget and toolkit event maps to exactly one engine entry point:
//! argument marshalling only, no business logic. The handler holds a weak
//! engine reference so a dropped engine ends dispatch cleanly.

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::orchestrator::core::CtiEngine;
use crate::widget::{
    Call, CallLogRequest, ClickToDialPayload, ContactSelectedPayload, NavigationPayload,
};

/// Inbound events from the softphone widget and the CRM toolkit
#[derive(Debug, Clone)]
pub enum CtiEvent {
    /// Widget session logged in
    LoggedIn,
    /// Widget session logged out
    LoggedOut,
    /// Phone system reported a call status change
    CallUpdated(Call),
    /// Phone system reported a call end
    CallEnded(Call),
    /// Widget requested an activity-log save
    LogRequested(CallLogRequest),
    /// Agent picked a contact in the widget
    ContactSelected(ContactSelectedPayload),
    /// CRM click-to-dial
    ClickToDial(ClickToDialPayload),
    /// CRM page navigation
    NavigationChanged(NavigationPayload),
}

/// Dispatches inbound events into the engine
#[derive(Clone)]
pub struct CtiEventHandler {
    engine: Weak<CtiEngine>,
}

impl CtiEventHandler {
    pub fn new(engine: &Arc<CtiEngine>) -> Self {
        Self {
            engine: Arc::downgrade(engine),
        }
    }

    /// Route one event to its engine entry point
    pub async fn dispatch(&self, event: CtiEvent) {
        let Some(engine) = self.engine.upgrade() else {
            warn!("engine dropped, ignoring event {:?}", event);
            return;
        };
        match event {
            CtiEvent::LoggedIn => engine.on_logged_in().await,
            CtiEvent::LoggedOut => engine.on_logged_out().await,
            CtiEvent::CallUpdated(call) => engine.on_call_updated(call).await,
            CtiEvent::CallEnded(call) => engine.on_call_ended(&call).await,
            CtiEvent::LogRequested(request) => engine.on_log_requested(request).await,
            CtiEvent::ContactSelected(payload) => engine.on_contact_selected(payload).await,
            CtiEvent::ClickToDial(payload) => engine.on_click_to_dial(payload).await,
            CtiEvent::NavigationChanged(payload) => engine.on_navigation_changed(payload).await,
        }
    }

    /// Drive dispatch from a channel, in arrival order, until it closes
    pub fn spawn(
        engine: &Arc<CtiEngine>,
        mut events: mpsc::UnboundedReceiver<CtiEvent>,
    ) -> JoinHandle<()> {
        let handler = Self::new(engine);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                handler.dispatch(event).await;
            }
            debug!("event channel closed, dispatch loop ending");
        })
    }
}
