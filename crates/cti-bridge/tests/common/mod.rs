//! Shared test support: a scripted CRM toolkit and an engine harness.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;

use cti_bridge::prelude::*;
use cti_bridge::toolkit::SCREEN_POP_MARKER;

/// One recorded toolkit invocation
#[derive(Debug, Clone)]
pub enum ToolkitCall {
    Search { number: String },
    ScreenPopDeferred(Value),
    ScreenPopRecord { record_id: String },
    SaveLog { who_id: String },
    PanelVisibility(bool),
    RefreshView,
    EnableClickToDial,
    DisableClickToDial,
}

/// Scripted toolkit: canned search responses per number, recorded calls
#[derive(Default)]
pub struct MockToolkit {
    search_responses: Mutex<HashMap<String, VecDeque<ScreenPopResponse>>>,
    save_errors: Mutex<Option<Vec<String>>>,
    search_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<ToolkitCall>>,
}

impl MockToolkit {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue responses for a number; once the script runs dry, further
    /// searches return a marker-only (no match) response.
    pub fn script_search(&self, number: &str, responses: Vec<ScreenPopResponse>) {
        self.search_responses
            .lock()
            .unwrap()
            .entry(number.to_string())
            .or_default()
            .extend(responses);
    }

    /// Make every save fail with the given error strings
    pub fn reject_saves(&self, errors: Vec<String>) {
        *self.save_errors.lock().unwrap() = Some(errors);
    }

    /// Delay each search by `delay` (virtual time)
    pub fn delay_searches(&self, delay: Duration) {
        *self.search_delay.lock().unwrap() = Some(delay);
    }

    pub fn recorded(&self) -> Vec<ToolkitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches_for(&self, number: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|c| matches!(c, ToolkitCall::Search { number: n } if n == number))
            .count()
    }

    pub fn deferred_pops(&self) -> usize {
        self.recorded()
            .iter()
            .filter(|c| matches!(c, ToolkitCall::ScreenPopDeferred(_)))
            .count()
    }

    pub fn save_count(&self) -> usize {
        self.recorded()
            .iter()
            .filter(|c| matches!(c, ToolkitCall::SaveLog { .. }))
            .count()
    }
}

#[async_trait]
impl CrmToolkit for MockToolkit {
    async fn search_and_screen_pop(&self, request: SearchRequest) -> Result<ScreenPopResponse> {
        self.calls.lock().unwrap().push(ToolkitCall::Search {
            number: request.number.clone(),
        });
        let delay = *self.search_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self
            .search_responses
            .lock()
            .unwrap()
            .get_mut(&request.number)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(no_match_response);
        Ok(response)
    }

    async fn screen_pop(&self, target: ScreenPopTarget) -> Result<()> {
        let call = match target {
            ScreenPopTarget::Deferred(payload) => ToolkitCall::ScreenPopDeferred(payload),
            ScreenPopTarget::Record { record_id } => ToolkitCall::ScreenPopRecord { record_id },
        };
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    async fn save_log(&self, log: ActivityLog) -> Result<()> {
        self.calls.lock().unwrap().push(ToolkitCall::SaveLog {
            who_id: log.who_id.clone(),
        });
        match self.save_errors.lock().unwrap().clone() {
            Some(errors) => Err(CtiError::save_rejected(errors)),
            None => Ok(()),
        }
    }

    async fn set_softphone_panel_visibility(&self, visible: bool) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ToolkitCall::PanelVisibility(visible));
        Ok(())
    }

    async fn refresh_view(&self) -> Result<()> {
        self.calls.lock().unwrap().push(ToolkitCall::RefreshView);
        Ok(())
    }

    async fn enable_click_to_dial(&self) -> Result<()> {
        self.calls.lock().unwrap().push(ToolkitCall::EnableClickToDial);
        Ok(())
    }

    async fn disable_click_to_dial(&self) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ToolkitCall::DisableClickToDial);
        Ok(())
    }
}

/// Search response with one matching record plus the deferred-pop marker
pub fn match_response(id: &str, name: &str, record_type: &str) -> ScreenPopResponse {
    let mut return_value = Map::new();
    return_value.insert(
        id.to_string(),
        json!({"Id": id, "Name": name, "RecordType": record_type}),
    );
    return_value.insert(
        SCREEN_POP_MARKER.to_string(),
        json!({"params": {"deferred": true}}),
    );
    ScreenPopResponse { return_value }
}

/// Marker-only search response: no matches, continuation present
pub fn no_match_response() -> ScreenPopResponse {
    let mut return_value = Map::new();
    return_value.insert(
        SCREEN_POP_MARKER.to_string(),
        json!({"params": {"deferred": true}}),
    );
    ScreenPopResponse { return_value }
}

/// Engine wired to a mock toolkit and a drained widget channel
pub struct Harness {
    pub engine: Arc<CtiEngine>,
    pub toolkit: Arc<MockToolkit>,
    pub widget_rx: mpsc::UnboundedReceiver<WidgetEvent>,
}

pub fn harness() -> Harness {
    harness_with(CtiConfig::default())
}

pub fn harness_with(config: CtiConfig) -> Harness {
    let toolkit = MockToolkit::new();
    let toolkit_dyn: Arc<dyn CrmToolkit> = toolkit.clone();
    let (widget_tx, widget_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(
        CtiEngine::new(config, toolkit_dyn, widget_tx).expect("default config is valid"),
    );
    Harness {
        engine,
        toolkit,
        widget_rx,
    }
}

impl Harness {
    /// Everything fired to the widget so far
    pub fn widget_events(&mut self) -> Vec<WidgetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.widget_rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn call_info_events(&mut self) -> Vec<(Call, Vec<Contact>)> {
        self.widget_events()
            .into_iter()
            .filter_map(|e| match e {
                WidgetEvent::CallInfo { call, contacts } => Some((call, contacts)),
                _ => None,
            })
            .collect()
    }
}

/// An incoming call from `number`, with distinct room/call ids per `n`
pub fn incoming_call(n: u32, number: &str) -> Call {
    Call {
        room_id: format!("room-{}", n),
        call_id: n.to_string(),
        incoming: true,
        party_number: number.to_string(),
        party_name: None,
        created_at: Utc::now(),
        answered_at: None,
        ended_at: None,
        tenant: None,
        user: None,
    }
}

pub fn nav(url: &str) -> NavigationPayload {
    NavigationPayload {
        url: url.to_string(),
        object_type: None,
        record_id: None,
        record_name: None,
    }
}

pub fn nav_with_record(url: &str, record_id: &str, record_name: &str, object_type: &str) -> NavigationPayload {
    NavigationPayload {
        url: url.to_string(),
        object_type: Some(object_type.to_string()),
        record_id: Some(record_id.to_string()),
        record_name: Some(record_name.to_string()),
    }
}
