//! Activity-log save pipeline.

use tracing::{error, info, warn};

use crate::orchestrator::core::CtiEngine;
use crate::toolkit::{ActivityLog, CallType};
use crate::widget::{CallLogRequest, LogDefault, Notification, WidgetEvent};

/// Raised when a log request arrives with no linked CRM record.
pub const NO_ASSOCIATED_CONTACT_MESSAGE: &str = "This call was not associated with a contact.";

impl CtiEngine {
    /// Widget log-request entry point
    ///
    /// A request without an associated record identity is rejected before
    /// any CRM call. A rejected save surfaces the CRM's first error message
    /// and leaves the session ready for the next event.
    pub async fn on_log_requested(&self, request: CallLogRequest) {
        let Some(who_id) = request.contact_id.clone().filter(|id| !id.is_empty()) else {
            warn!(
                "⚠️ log request for call {} has no associated record, aborting save",
                request.call.key()
            );
            self.fire(WidgetEvent::Notification(Notification::error(
                NO_ASSOCIATED_CONTACT_MESSAGE,
            )));
            return;
        };

        let log = build_activity_log(&request, who_id);
        match self.toolkit.save_log(log).await {
            Ok(()) => {
                info!("📝 activity log saved for call {}", request.call.key());
                self.fire(WidgetEvent::LogSaved { log: request });
                if let Err(e) = self.toolkit.refresh_view().await {
                    warn!("view refresh after log save failed: {}", e);
                }
            }
            Err(e) => {
                let first = e.first_message();
                error!(
                    "❌ activity log save for call {} failed: {}",
                    request.call.key(),
                    first
                );
                self.fire(WidgetEvent::LogFailed { log: request });
                self.fire(WidgetEvent::Notification(Notification::error(format!(
                    "Failed to save call log: {}",
                    first
                ))));
            }
        }
    }
}

/// Build the CRM field map for a log request
///
/// The call-object reference carries the recording when one exists,
/// otherwise a tenant/call/user composite.
fn build_activity_log(request: &CallLogRequest, who_id: String) -> ActivityLog {
    let call = &request.call;
    let input = |name: &str| {
        request
            .inputs
            .get(name)
            .cloned()
            .filter(|value| !value.is_empty())
    };

    let call_object = request.recording_id.clone().or_else(|| {
        match (&call.tenant, &call.user) {
            (Some(tenant), Some(user)) => Some(format!(
                "{} {}.{} {}",
                tenant,
                call.call_id,
                call.created_at.timestamp_millis(),
                user
            )),
            _ => None,
        }
    });

    ActivityLog {
        subject: input("subject")
            .unwrap_or_else(|| LogDefault::DirectionAndNumber.resolve(call)),
        status: "completed".to_string(),
        call_type: CallType::for_call(call).as_str().to_string(),
        call_object,
        phone: call.party_number.clone(),
        description: input("description"),
        disposition: input("result"),
        duration_seconds: call.duration().num_seconds(),
        who_id,
        what_id: request.related_id.clone(),
        entity: "Task".to_string(),
    }
}
