use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use super::{Mailer, VerificationEmail};
use crate::config::SmtpConfig;

/// STARTTLS relay backed by lettre's pooled tokio transport.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(cfg.username.clone(), cfg.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .with_context(|| format!("configure smtp relay {}", cfg.host))?
            .port(cfg.port)
            .credentials(creds)
            .build();
        let from = cfg
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("parse MAIL_FROM {}", cfg.from))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, email: &VerificationEmail) -> anyhow::Result<()> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("parse recipient {}", email.to))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body())
            .context("build verification message")?;

        let response = self
            .transport
            .send(message)
            .await
            .context("smtp send")?;
        debug!(code = ?response.code(), "smtp accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(from: &str) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            password: "secret".into(),
            from: from.into(),
        }
    }

    #[tokio::test]
    async fn builds_with_valid_sender() {
        assert!(SmtpMailer::new(&cfg("Iwo News <no-reply@example.com>")).is_ok());
    }

    #[tokio::test]
    async fn rejects_malformed_sender() {
        assert!(SmtpMailer::new(&cfg("not an address")).is_err());
    }
}
