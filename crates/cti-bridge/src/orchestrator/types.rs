//! Shared pipeline types.

use serde_json::Value;

use crate::contact::Contact;

/// What triggered a record search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrigin {
    /// A fresh call arrival; shows the softphone panel
    FreshCall,
    /// A queue-driven re-search; never touches panel visibility
    Requeue,
}

/// Classified result of one record search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// One or more candidate records matched
    Match { contacts: Vec<Contact> },
    /// No record matched; the deferred screen-pop payload (when present)
    /// can open a "create new record" modal later
    NoMatch { continuation: Option<Value> },
}
