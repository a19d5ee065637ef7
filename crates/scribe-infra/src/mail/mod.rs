//! Mail port implementation. The default transport writes outbound messages
//! to the log; deployments wire a real transport behind the same port.

use async_trait::async_trait;

use scribe_core::ports::{MailError, MailMessage, Mailer};

/// Mailer that emits messages as structured log events.
#[derive(Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Outbound mail"
        );
        Ok(())
    }
}
