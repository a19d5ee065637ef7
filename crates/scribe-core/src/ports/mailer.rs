//! Outbound mail port. Account activation and password-reset tokens leave the
//! system through this seam; the transport behind it is deployment-specific.

use async_trait::async_trait;

/// A message to deliver to a single recipient.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}
