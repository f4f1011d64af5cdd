//! Normalized contact shape and record-label formatting.

use serde::{Deserialize, Serialize};

use crate::toolkit::SearchRecord;

/// A CRM record normalized for the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// CRM record id
    pub id: String,
    /// Display label, composed via [`format_record_name`]
    pub name: String,
    /// CRM record type (Contact, Account, Lead, ...)
    pub record_type: String,
}

/// Compose the display label for a CRM record
///
/// ```
/// use cti_bridge::contact::format_record_name;
///
/// assert_eq!(format_record_name("Jane Doe", "Contact"), "Jane Doe [Contact]");
/// ```
pub fn format_record_name(name: &str, record_type: &str) -> String {
    format!("{} [{}]", name, record_type)
}

impl Contact {
    /// Project a raw search record into the widget-facing shape
    pub fn from_record(record: &SearchRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: format_record_name(&record.name, &record.record_type),
            record_type: record.record_type.clone(),
        }
    }
}
