use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CtiError, Result};
use crate::queue::polling::PollSchedule;

/// Bridge configuration
///
/// # Configuration Sections
///
/// - [`general`]: queue-run debounce and panel behavior
/// - [`polling`]: bounded re-search schedules for queued contacts
/// - [`navigation`]: new-record modal paths and the background-context
///   query parameter used for save/cancel classification
///
/// # Examples
///
/// ```
/// use cti_bridge::CtiConfig;
///
/// let mut config = CtiConfig::default();
/// config.polling.repoll_max_attempts = 8;
/// config.validate().expect("configuration should be valid");
/// ```
///
/// [`general`]: GeneralConfig
/// [`polling`]: PollingConfig
/// [`navigation`]: NavigationConfig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtiConfig {
    /// General bridge behavior
    pub general: GeneralConfig,

    /// Re-search polling for queued new-contact entries
    pub polling: PollingConfig,

    /// Navigation classification settings
    pub navigation: NavigationConfig,
}

/// General bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Delay before promoting the next queued entry after a navigation
    /// settles, in milliseconds
    ///
    /// Gives the CRM time to finish its own post-save/post-cancel navigation
    /// before the next "create new record" modal is opened.
    pub queue_run_delay_ms: u64,

    /// Make the softphone panel visible when a fresh call arrives
    ///
    /// Requeue-driven re-searches never touch panel visibility.
    pub show_panel_on_call: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            queue_run_delay_ms: 2_500,
            show_panel_on_call: true,
        }
    }
}

/// Bounded re-search polling configuration
///
/// After a modal resolves, every still-open queued entry is re-searched on a
/// timer until it matches or its attempt budget runs out. The entry whose
/// party number matches the just-resolved call gets the *focused* schedule
/// (shorter interval, larger budget) to catch asynchronous CRM indexing lag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Default re-search interval in milliseconds
    pub repoll_interval_ms: u64,

    /// Default re-search attempt budget
    pub repoll_max_attempts: u32,

    /// Focused re-search interval in milliseconds
    pub focused_interval_ms: u64,

    /// Focused re-search attempt budget
    pub focused_max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            repoll_interval_ms: 3_000,
            repoll_max_attempts: 5,
            focused_interval_ms: 1_000,
            focused_max_attempts: 10,
        }
    }
}

impl PollingConfig {
    /// Schedule for entries unrelated to the just-resolved call
    pub fn default_schedule(&self) -> PollSchedule {
        PollSchedule {
            interval: Duration::from_millis(self.repoll_interval_ms),
            max_attempts: self.repoll_max_attempts,
        }
    }

    /// Schedule for the entry matching the just-resolved call
    pub fn focused_schedule(&self) -> PollSchedule {
        PollSchedule {
            interval: Duration::from_millis(self.focused_interval_ms),
            max_attempts: self.focused_max_attempts,
        }
    }
}

/// Navigation classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// URL paths of the CRM's "create new record" modals
    pub new_record_paths: Vec<String>,

    /// Query parameter on a modal URL naming the page beneath the modal
    ///
    /// Returning to that page after the modal closes is read as a cancel.
    pub background_param: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            new_record_paths: vec![
                "/lightning/o/Contact/new".to_string(),
                "/lightning/o/Account/new".to_string(),
                "/lightning/o/Lead/new".to_string(),
            ],
            background_param: "backgroundContext".to_string(),
        }
    }
}

impl Default for CtiConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            polling: PollingConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

impl CtiConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.polling.repoll_max_attempts == 0 || self.polling.focused_max_attempts == 0 {
            return Err(CtiError::configuration(
                "re-search attempt budgets must be at least 1",
            ));
        }
        if self.polling.repoll_interval_ms == 0 || self.polling.focused_interval_ms == 0 {
            return Err(CtiError::configuration(
                "re-search intervals must be non-zero",
            ));
        }
        if self.navigation.new_record_paths.is_empty() {
            return Err(CtiError::configuration(
                "at least one new-record modal path is required",
            ));
        }
        if self.navigation.background_param.is_empty() {
            return Err(CtiError::configuration(
                "background-context query parameter name is required",
            ));
        }
        Ok(())
    }
}
