// src/services/mailer.rs
// DOCUMENTATION: Outbound email notifications
// PURPOSE: Send plain-text job summaries over SMTP without failing callers

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Email delivery seam. Sending is best-effort: a failure is logged and
/// reported as `None`, never propagated to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Option<()>;
}

/// SMTP mailer using implicit TLS on the submission port
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, user: String, pass: String) -> Result<Self, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(user.clone(), pass))
            .build();

        Ok(Self {
            transport,
            from: user,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Option<()> {
        let message = Message::builder()
            .from(self.from.parse().ok()?)
            .to(to.parse().ok()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .ok()?;

        match self.transport.send(message).await {
            Ok(_) => {
                log::info!("Sent email '{}' to {}", subject, to);
                Some(())
            }
            Err(e) => {
                log::error!("Failed to send email '{}' to {}: {}", subject, to, e);
                None
            }
        }
    }
}

/// Used when SMTP credentials are not configured
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Option<()> {
        log::warn!("Email delivery disabled; dropping '{}' for {}", subject, to);
        None
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct SentEmail {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<SentEmail>>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_email(&self, to: &str, subject: &str, body: &str) -> Option<()> {
            self.sent.lock().unwrap().push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Some(())
        }
    }
}
