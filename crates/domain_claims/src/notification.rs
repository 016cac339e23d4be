//! Notification Hook
//!
//! Best-effort side channel after review decisions. Dispatch failures are
//! logged and dropped; they never reach the caller of the review operation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::claim::Claim;
use crate::ports::{NotificationPort, ReviewNotice};

#[derive(Clone)]
pub struct NotificationHook {
    port: Arc<dyn NotificationPort>,
}

impl NotificationHook {
    pub fn new(port: Arc<dyn NotificationPort>) -> Self {
        Self { port }
    }

    /// Tells the claimant about a review decision
    ///
    /// Returns whether the notice was handed off successfully.
    pub async fn review_decided(&self, claim: &Claim) -> bool {
        let Some(notice) = ReviewNotice::for_claim(claim) else {
            debug!(claim_id = %claim.id, "No notice for pending claim");
            return false;
        };

        match self.port.dispatch(&notice).await {
            Ok(()) => {
                debug!(claim_id = %claim.id, decision = ?notice.decision, "Review notice dispatched");
                true
            }
            Err(error) => {
                warn!(
                    claim_id = %claim.id,
                    recipient = %notice.recipient.email,
                    error = %error,
                    "Review notice could not be dispatched"
                );
                false
            }
        }
    }
}
