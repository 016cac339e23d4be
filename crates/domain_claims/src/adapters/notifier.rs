//! Tracing-backed notifier
//!
//! Writes review notices to the log instead of delivering them. Used when no
//! mail or push channel is configured.

use async_trait::async_trait;
use tracing::info;

use core_kernel::{DomainPort, PortError};

use crate::ports::{NotificationPort, ReviewNotice};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl DomainPort for TracingNotifier {}

#[async_trait]
impl NotificationPort for TracingNotifier {
    async fn dispatch(&self, notice: &ReviewNotice) -> Result<(), PortError> {
        info!(
            claim_id = %notice.claim_id,
            recipient = %notice.recipient.email,
            decision = ?notice.decision,
            subject = %notice.subject(),
            notes = notice.notes.as_deref().unwrap_or(""),
            "Review notice"
        );
        Ok(())
    }
}
