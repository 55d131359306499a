//! Review notifier that records notices in the structured log.
//!
//! No push channel exists for reviewers yet, so delivery means one `info`
//! event per notice that log shippers can route.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ReviewNotifier, ReviewNotifierError, ReviewPostedNotice};

/// Notifier emitting one tracing event per notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReviewNotifier;

#[async_trait]
impl ReviewNotifier for TracingReviewNotifier {
    async fn notify(&self, notice: &ReviewPostedNotice) -> Result<(), ReviewNotifierError> {
        let recipients = notice
            .recipients
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        info!(
            place_id = %notice.place_id,
            recipient_count = notice.recipients.len(),
            recipients,
            "new review posted for a place you reviewed"
        );
        Ok(())
    }
}
