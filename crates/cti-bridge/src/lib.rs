//! # CTI Bridge
//!
//! Wires a softphone widget to a CRM's embedded telephony toolkit. Phone-system
//! events (call updated/ended, log requested) become CRM actions (screen-pop a
//! matching record, save an activity log), and CRM UI events (click-to-dial,
//! contact selection, page navigation) become phone-system actions (place a
//! call) or feed the reconciliation machinery.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐          ┌──────────────────┐
//! │ Softphone widget │          │   CRM toolkit    │
//! │  (event stream)  │          │  (async calls)   │
//! └────────┬─────────┘          └────────▲─────────┘
//!          │ CtiEvent                    │ CrmToolkit trait
//! ┌────────▼────────────────────────────┴─────────┐
//! │                  CtiEngine                    │
//! │  session tracking │ search pipeline │ logging │
//! └────────────────────────┬──────────────────────┘
//!                          │
//!                 ┌────────▼────────┐
//!                 │  ContactQueue   │  new-record modals, one at a time,
//!                 │  + re-polling   │  save/cancel inferred from navigation
//!                 └─────────────────┘
//! ```
//!
//! The one nontrivial piece is the new-contact queue: when a call's number
//! matches no CRM record, the toolkit can open a "create new record" modal,
//! but only one at a time, and it never says whether the user saved or
//! cancelled. Pending calls are queued, modals are presented serially, and
//! completion is inferred from the page-navigation stream plus bounded
//! re-search polling (see [`queue`]).
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cti_bridge::prelude::*;
//! use tokio::sync::mpsc;
//!
//! # async fn example(toolkit: Arc<dyn CrmToolkit>) -> Result<()> {
//! let (widget_tx, mut widget_rx) = mpsc::unbounded_channel();
//! let engine = Arc::new(CtiEngine::new(CtiConfig::default(), toolkit, widget_tx)?);
//!
//! let (event_tx, event_rx) = mpsc::unbounded_channel();
//! let _dispatch = CtiEventHandler::spawn(&engine, event_rx);
//!
//! // Feed widget/toolkit events in, read widget commands out.
//! event_tx.send(CtiEvent::LoggedIn).ok();
//! while let Some(event) = widget_rx.recv().await {
//!     println!("to widget: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;

// Pure helpers
pub mod contact;
pub mod navigation;

// External boundaries
pub mod toolkit;
pub mod widget;

// Engine
pub mod orchestrator;
pub mod queue;

// Re-exports for convenience
pub use config::CtiConfig;
pub use error::{CtiError, Result};
pub use orchestrator::core::CtiEngine;
pub use orchestrator::handler::{CtiEvent, CtiEventHandler};

/// Prelude module for convenient imports
pub mod prelude {
    //! Commonly used types for embedding the bridge.

    pub use crate::config::{CtiConfig, GeneralConfig, NavigationConfig, PollingConfig};
    pub use crate::contact::{format_record_name, Contact};
    pub use crate::error::{CtiError, Result};
    pub use crate::orchestrator::core::{BridgeStats, CtiEngine};
    pub use crate::orchestrator::handler::{CtiEvent, CtiEventHandler};
    pub use crate::queue::polling::PollSchedule;
    pub use crate::toolkit::{
        ActivityLog, CallType, CrmToolkit, ScreenPopResponse, ScreenPopTarget, SearchRequest,
    };
    pub use crate::widget::{
        Call, CallKey, CallLogRequest, ClickToDialPayload, ContactSelectedPayload,
        NavigationPayload, Notification, NotificationKind, WidgetEvent,
    };

    pub use chrono::{DateTime, Utc};
}
