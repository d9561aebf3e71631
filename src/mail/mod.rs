//! Outbound email. Verification mail is a side channel: the workflow awaits it,
//! logs a failure, and carries on.

use async_trait::async_trait;
use tracing::{info, warn};

#[cfg(test)]
pub mod memory;
pub mod smtp;

#[cfg(test)]
pub use memory::RecordingMailer;
pub use smtp::SmtpMailer;

/// A verification code addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub to: String,
    pub first_name: String,
    pub code: String,
    pub verify_url: String,
    pub expires_in_minutes: i64,
}

impl VerificationEmail {
    pub fn subject(&self) -> &'static str {
        "Verify your email address"
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hello {},\n\nYour verification code is {}.\nConfirm your account here: {}\n\n\
             The code expires in {} minutes.\n",
            self.first_name, self.code, self.verify_url, self.expires_in_minutes
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, email: &VerificationEmail) -> anyhow::Result<()>;
}

/// Used when no SMTP relay is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &VerificationEmail) -> anyhow::Result<()> {
        info!(to = %email.to, "smtp not configured; verification email dropped");
        Ok(())
    }
}

/// Sends once and swallows the outcome. Returns whether the mailer accepted it.
pub async fn dispatch_verification(mailer: &dyn Mailer, email: VerificationEmail) -> bool {
    match mailer.send_verification(&email).await {
        Ok(()) => {
            info!(to = %email.to, "verification email sent");
            true
        }
        Err(e) => {
            warn!(to = %email.to, error = %e, "verification email failed");
            false
        }
    }
}

/// First whitespace-separated token of a display name.
pub fn first_name(display_name: &str) -> &str {
    display_name.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> VerificationEmail {
        VerificationEmail {
            to: "a@x.com".into(),
            first_name: "Ann".into(),
            code: "Ab12Cd34".into(),
            verify_url: "http://localhost:8080/api/auth/verify/Ab12Cd34".into(),
            expires_in_minutes: 5,
        }
    }

    #[test]
    fn first_name_takes_leading_token() {
        assert_eq!(first_name("Ann Lee"), "Ann");
        assert_eq!(first_name("  Mary   Jane Watson "), "Mary");
        assert_eq!(first_name("Cher"), "Cher");
        assert_eq!(first_name(""), "");
    }

    #[test]
    fn body_carries_code_and_link() {
        let body = email().text_body();
        assert!(body.contains("Hello Ann"));
        assert!(body.contains("Ab12Cd34"));
        assert!(body.contains("/api/auth/verify/Ab12Cd34"));
        assert!(body.contains("5 minutes"));
    }

    #[tokio::test]
    async fn dispatch_reports_failure_without_erroring() {
        let failing = RecordingMailer::failing();
        assert!(!dispatch_verification(&failing, email()).await);
        assert_eq!(failing.attempts().await, 1);

        let ok = RecordingMailer::new();
        assert!(dispatch_verification(&ok, email()).await);
        assert_eq!(ok.sent().await, vec![email()]);
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        assert!(dispatch_verification(&LogMailer, email()).await);
    }
}
