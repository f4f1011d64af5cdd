//! CRM toolkit boundary.
//!
//! The toolkit is an opaque remote service reached through callback-style
//! calls in the host page; here it is abstracted as [`CrmToolkit`], an async
//! trait whose operations return explicit success/failure variants. The
//! reconciliation logic never sees a callback convention.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::widget::Call;

/// Key under which the toolkit smuggles its deferred screen-pop payload into
/// a search result. Not a record; filtered out before match counting.
pub const SCREEN_POP_MARKER: &str = "SCREEN_POP_DATA";

/// Direction of a call, as the CRM classifies searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    Inbound,
    Outbound,
}

impl CallType {
    pub fn for_call(call: &Call) -> Self {
        if call.incoming {
            Self::Inbound
        } else {
            Self::Outbound
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
        }
    }
}

/// One directory search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The remote party's number
    pub number: String,
    /// Search classification
    pub call_type: CallType,
    /// Field values prefilled into an eventual "create new record" modal
    pub default_field_values: Map<String, Value>,
}

impl SearchRequest {
    /// Build the search for a call, prefilling the phone number so a
    /// no-match modal starts out populated.
    pub fn for_call(call: &Call) -> Self {
        let mut defaults = Map::new();
        defaults.insert("Phone".to_string(), Value::String(call.party_number.clone()));
        Self {
            number: call.party_number.clone(),
            call_type: CallType::for_call(call),
            default_field_values: defaults,
        }
    }
}

/// Raw search result, as delivered by the toolkit
///
/// The return value is a map keyed by record id whose entries are record
/// field objects, except the toolkit's own [`SCREEN_POP_MARKER`] entry,
/// which carries the opaque continuation payload for a deferred screen-pop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenPopResponse {
    pub return_value: Map<String, Value>,
}

impl ScreenPopResponse {
    /// Split the raw map into candidate records and the continuation payload.
    ///
    /// The marker entry must be filtered out before counting matches.
    pub fn split(mut self) -> (Vec<SearchRecord>, Option<Value>) {
        let continuation = self.return_value.remove(SCREEN_POP_MARKER);
        let records = self
            .return_value
            .into_iter()
            .map(|(id, value)| SearchRecord::from_entry(id, &value))
            .collect();
        (records, continuation)
    }
}

/// One candidate record from a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: String,
    pub name: String,
    pub record_type: String,
}

impl SearchRecord {
    /// Project a raw result entry. The map key is authoritative for the id;
    /// the entry's own fields fill in name and type.
    pub fn from_entry(id: String, value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            id,
            name: field("Name"),
            record_type: field("RecordType"),
        }
    }
}

/// What a screen-pop should navigate to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScreenPopTarget {
    /// Replay a stored continuation payload (opens the deferred search's
    /// pop; for a no-match search, the "create new record" modal)
    Deferred(Value),
    /// Navigate to a concrete record
    Record { record_id: String },
}

/// An activity log in the CRM's save shape
///
/// Field names follow the CRM's task entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "CallType")]
    pub call_type: String,
    #[serde(rename = "CallObject", skip_serializing_if = "Option::is_none")]
    pub call_object: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "CallDisposition", skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(rename = "CallDurationInSeconds")]
    pub duration_seconds: i64,
    #[serde(rename = "WhoId")]
    pub who_id: String,
    #[serde(rename = "WhatId", skip_serializing_if = "Option::is_none")]
    pub what_id: Option<String>,
    #[serde(rename = "entityApiName")]
    pub entity: String,
}

/// Async interface to the CRM telephony toolkit
///
/// Implementations adapt the host page's callback convention; every
/// operation resolves to an explicit success/failure result. A save
/// rejection surfaces as [`CtiError::SaveRejected`] carrying the CRM's
/// error strings.
///
/// [`CtiError::SaveRejected`]: crate::error::CtiError::SaveRejected
#[async_trait]
pub trait CrmToolkit: Send + Sync {
    /// One directory search for a call's party number, with deferred
    /// screen-pop data in the result
    async fn search_and_screen_pop(&self, request: SearchRequest) -> Result<ScreenPopResponse>;

    /// Navigate the agent's screen
    async fn screen_pop(&self, target: ScreenPopTarget) -> Result<()>;

    /// Save an activity log
    async fn save_log(&self, log: ActivityLog) -> Result<()>;

    /// Show or hide the softphone panel
    async fn set_softphone_panel_visibility(&self, visible: bool) -> Result<()>;

    /// Ask the CRM to refresh the current view
    async fn refresh_view(&self) -> Result<()>;

    /// Enable the click-to-dial affordance
    async fn enable_click_to_dial(&self) -> Result<()>;

    /// Disable the click-to-dial affordance
    async fn disable_click_to_dial(&self) -> Result<()>;
}
