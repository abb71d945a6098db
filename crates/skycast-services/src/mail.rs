//! Outbound mail delivery.
//!
//! `MailSender` wraps either a real SMTP transport or an in-memory recorder
//! with one send interface, so the statistics job does not care which backend
//! it is talking to.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use thiserror::Error;

/// Errors from building or delivering mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build mail message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// A delivered (or recorded) email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Shared handle to mail recorded by the in-memory backend.
pub type Mailbox = Arc<Mutex<Vec<OutboundEmail>>>;

/// Mail sender supporting SMTP and in-memory backends.
#[derive(Clone)]
pub enum MailSender {
    /// Real SMTP delivery.
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: String,
        to: String,
    },

    /// In-memory recorder (for tests).
    Memory {
        mailbox: Mailbox,
        from: String,
        to: String,
    },
}

impl MailSender {
    /// Create an SMTP-backed sender.
    ///
    /// An empty `username` selects an unauthenticated relay.
    pub fn smtp(
        host: &str,
        username: &str,
        password: &str,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?;
        if !username.is_empty() {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }

        Ok(Self::Smtp {
            transport: builder.build(),
            from: from.into(),
            to: to.into(),
        })
    }

    /// Create an in-memory sender together with the mailbox it records into.
    pub fn memory(from: impl Into<String>, to: impl Into<String>) -> (Self, Mailbox) {
        let mailbox: Mailbox = Arc::new(Mutex::new(Vec::new()));
        let sender = Self::Memory {
            mailbox: mailbox.clone(),
            from: from.into(),
            to: to.into(),
        };
        (sender, mailbox)
    }

    /// Send one plain-text message to the configured recipient.
    pub async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        match self {
            Self::Smtp {
                transport,
                from,
                to,
            } => {
                let message = Message::builder()
                    .from(from.parse()?)
                    .to(to.parse()?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body.to_string())?;

                transport.send(message).await?;
                tracing::info!("Statistics email sent to {}", to);
                Ok(())
            }
            Self::Memory { mailbox, from, to } => {
                mailbox.lock().push(OutboundEmail {
                    from: from.clone(),
                    to: to.clone(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[tokio::test]
    async fn test_memory_sender_records_mail() {
        let (sender, mailbox) = MailSender::memory("noreply@example.com", "admin@example.com");

        sender.send("Subject line", "Body text").await.unwrap();

        let sent = mailbox.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "noreply@example.com");
        assert_eq!(sent[0].to, "admin@example.com");
        assert_eq!(sent[0].subject, "Subject line");
        assert_eq!(sent[0].body, "Body text");
    }
}
