//! Softphone widget boundary: inbound payload types and outbound events.
//!
//! Inbound payloads mirror what the widget's event bus delivers; outbound
//! [`WidgetEvent`]s are pushed over an unbounded channel the host drains
//! back into the widget.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::Contact;

/// Composite call identity: room identifier and call identifier,
/// concatenated. Never reused across distinct calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallKey(pub String);

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One phone call, as announced by the phone system
///
/// Received and referenced here, never structurally mutated: the phone
/// system owns every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    /// Room identifier assigned by the phone system
    pub room_id: String,
    /// Call identifier within the room
    pub call_id: String,
    /// Direction: true for incoming
    pub incoming: bool,
    /// The remote party's number
    pub party_number: String,
    /// The remote party's display name, when the phone system knows one
    pub party_name: Option<String>,
    /// When the phone system created the call
    pub created_at: DateTime<Utc>,
    /// When the call was answered, if it was
    pub answered_at: Option<DateTime<Utc>>,
    /// When the call ended, if it has
    pub ended_at: Option<DateTime<Utc>>,
    /// Tenant context, when provided
    pub tenant: Option<String>,
    /// User context, when provided
    pub user: Option<String>,
}

impl Call {
    /// Stable composite identity
    pub fn key(&self) -> CallKey {
        CallKey(format!("{}{}", self.room_id, self.call_id))
    }

    /// Talk duration, derived at logging time
    ///
    /// Measured from answer (or creation, for never-answered calls) to end
    /// (or now, for calls still up).
    pub fn duration(&self) -> Duration {
        let start = self.answered_at.unwrap_or(self.created_at);
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - start).max(Duration::zero())
    }

    /// Human direction label
    pub fn direction_label(&self) -> &'static str {
        if self.incoming {
            "Inbound"
        } else {
            "Outbound"
        }
    }
}

/// Click-to-dial request from the CRM UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickToDialPayload {
    pub number: String,
}

/// Page-navigation notification from the CRM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationPayload {
    pub url: String,
    pub object_type: Option<String>,
    pub record_id: Option<String>,
    pub record_name: Option<String>,
}

/// The agent picked one of several matched contacts in the widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSelectedPayload {
    pub contact_id: String,
}

/// A request to log a finished call as a CRM activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLogRequest {
    /// The call being logged
    pub call: Call,
    /// Form inputs keyed by field name (see [`default_log_inputs`])
    pub inputs: HashMap<String, String>,
    /// Linked CRM record id, required for a save
    pub contact_id: Option<String>,
    /// Linked record type
    pub contact_type: Option<String>,
    /// Recording reference for the call, if one was made
    pub recording_id: Option<String>,
    /// Related record id (deal, case, ...)
    pub related_id: Option<String>,
}

/// User-visible notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

/// User-visible notification raised in the widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Input kind for a log-form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogInputKind {
    Text,
    TextArea,
}

/// Derivation for a log-form field's default value
///
/// Declared in the config event; the widget resolves it per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogDefault {
    /// "Inbound call from 555-1234" / "Outbound call to 555-1234"
    DirectionAndNumber,
    /// The remote party's number
    PartyNumber,
}

impl LogDefault {
    /// Resolve the default for a concrete call
    pub fn resolve(&self, call: &Call) -> String {
        match self {
            Self::DirectionAndNumber => {
                let preposition = if call.incoming { "from" } else { "to" };
                format!(
                    "{} call {} {}",
                    call.direction_label(),
                    preposition,
                    call.party_number
                )
            }
            Self::PartyNumber => call.party_number.clone(),
        }
    }
}

/// One field of the log-entry form schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInput {
    pub name: String,
    pub label: String,
    pub kind: LogInputKind,
    pub required: bool,
    pub default: Option<LogDefault>,
}

/// The log-entry form declared to the widget at login
pub fn default_log_inputs() -> Vec<LogInput> {
    vec![
        LogInput {
            name: "subject".to_string(),
            label: "Subject".to_string(),
            kind: LogInputKind::Text,
            required: true,
            default: Some(LogDefault::DirectionAndNumber),
        },
        LogInput {
            name: "description".to_string(),
            label: "Description".to_string(),
            kind: LogInputKind::TextArea,
            required: false,
            default: None,
        },
        LogInput {
            name: "result".to_string(),
            label: "Result".to_string(),
            kind: LogInputKind::Text,
            required: false,
            default: None,
        },
    ]
}

/// Events fired back into the softphone widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WidgetEvent {
    /// Place a call (click-to-dial)
    MakeCall { number: String },
    /// Attach matched or newly created CRM records to a call
    CallInfo { call: Call, contacts: Vec<Contact> },
    /// The activity log was saved
    LogSaved { log: CallLogRequest },
    /// The activity log save failed
    LogFailed { log: CallLogRequest },
    /// Raise a user-visible notification
    Notification(Notification),
    /// Declare the log-entry form schema
    Config { log_inputs: Vec<LogInput> },
}
