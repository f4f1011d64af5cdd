//! Engine coordination: session tracking, the screen-pop search pipeline,
//! activity logging, and inbound event dispatch.

pub mod calls;
pub mod core;
pub mod handler;
pub mod logging;
pub mod types;

pub use self::core::{BridgeStats, CtiEngine};
pub use self::handler::{CtiEvent, CtiEventHandler};
pub use self::logging::NO_ASSOCIATED_CONTACT_MESSAGE;
pub use self::types::{SearchOrigin, SearchOutcome};
