//! Mailbox connection and purchase-mail sync guidance

use async_trait::async_trait;

use shopsaver_core::{Handler, HandlerError, HandlerLabel};

/// Mail handler. Walks the user through connecting a mailbox; the actual
/// OAuth dance happens outside the chat surface.
#[derive(Default)]
pub struct MailHandler;

impl MailHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for MailHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::Mail
    }

    async fn handle(&self, _user_id: &str, message: &str) -> Result<String, HandlerError> {
        let lower = message.to_lowercase();
        if lower.contains("sync") || lower.contains("scan") {
            Ok("Once your mailbox is connected I scan it for order confirmations and \
                receipts, and turn them into expense records automatically. Say \
                \"connect my email\" to get started."
                .to_string())
        } else {
            Ok("To connect your mailbox, open Settings > Connected accounts in the app \
                and authorize read-only access. I only look at shopping receipts and \
                order confirmations, nothing else."
                .to_string())
        }
    }
}
