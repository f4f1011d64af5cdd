use thiserror::Error;

/// Error types for bridge operations
///
/// Covers the failure modes of the CRM boundary and the bridge's own wiring.
/// A no-match search result is *not* an error; it is a normal outcome routed
/// to the new-contact queue.
///
/// # Examples
///
/// ```
/// use cti_bridge::{CtiError, Result};
///
/// fn pop_record(id: &str) -> Result<()> {
///     if id.is_empty() {
///         return Err(CtiError::toolkit("record id missing from screen-pop target"));
///     }
///     Ok(())
/// }
///
/// assert!(pop_record("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum CtiError {
    /// Transport-level failure talking to the CRM toolkit
    ///
    /// The toolkit call itself failed (bridge script gone, iframe detached,
    /// malformed response). Distinct from a *rejected* save, which carries
    /// structured errors.
    #[error("Toolkit error: {0}")]
    Toolkit(String),

    /// The CRM accepted the save call but rejected the activity log
    ///
    /// Carries the toolkit's reported error strings; the first one is used
    /// for diagnostics and user-facing notifications.
    #[error("Save rejected: {0:?}")]
    SaveRejected(Vec<String>),

    /// A log request arrived with no linked CRM record identity
    ///
    /// Rejected before any CRM call is attempted.
    #[error("Log request has no associated record")]
    MissingAssociation,

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The widget event channel is closed
    #[error("Widget channel error: {0}")]
    Widget(String),

    /// Unexpected internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CtiError {
    fn from(err: anyhow::Error) -> Self {
        // Unexpected errors from lower-level components map to Internal.
        Self::Internal(err.to_string())
    }
}

impl CtiError {
    /// Create a new Toolkit error with the provided message
    pub fn toolkit<S: Into<String>>(msg: S) -> Self {
        Self::Toolkit(msg.into())
    }

    /// Create a new SaveRejected error from the toolkit's error strings
    pub fn save_rejected(errors: Vec<String>) -> Self {
        Self::SaveRejected(errors)
    }

    /// Create a new Configuration error with the provided message
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new Widget error with the provided message
    pub fn widget<S: Into<String>>(msg: S) -> Self {
        Self::Widget(msg.into())
    }

    /// Create a new Internal error with the provided message
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// First reported error message, for diagnostics
    ///
    /// For [`CtiError::SaveRejected`] this is the first structured error the
    /// CRM returned; for everything else it is the display form.
    pub fn first_message(&self) -> String {
        match self {
            Self::SaveRejected(errors) => errors
                .first()
                .cloned()
                .unwrap_or_else(|| "save rejected with no error detail".to_string()),
            other => other.to_string(),
        }
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, CtiError>;
