use async_trait::async_trait;
use tokio::sync::Mutex;

use iwo_api::mail::{Mailer, VerificationEmail};

/// Captures verification mail so tests can read the issued codes.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<VerificationEmail>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<VerificationEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }

    pub async fn last_to(&self, to: &str) -> Option<VerificationEmail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &VerificationEmail) -> anyhow::Result<()> {
        *self.attempts.lock().await += 1;
        if self.fail {
            anyhow::bail!("smtp relay refused connection");
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
