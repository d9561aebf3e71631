use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::mail::{LogMailer, Mailer, SmtpMailer};
use crate::news::repo::{NewsRepo, PgNewsRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub news: Arc<dyn NewsRepo>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Connects to Postgres and picks a mailer from the config.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => {
                tracing::warn!("SMTP_HOST not set; verification emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        let state = Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            news: Arc::new(PgNewsRepo::new(db.clone())),
            mailer,
            config,
        };
        Ok((state, db))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        news: Arc<dyn NewsRepo>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            users,
            news,
            mailer,
        }
    }

    /// In-memory stores, a recording mailer and `AppConfig::fake()`.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::auth::repo::InMemoryUserRepo;
        use crate::mail::RecordingMailer;
        use crate::news::repo::InMemoryNewsRepo;

        Self::from_parts(
            Arc::new(AppConfig::fake()),
            Arc::new(InMemoryUserRepo::new()),
            Arc::new(InMemoryNewsRepo::new()),
            Arc::new(RecordingMailer::new()),
        )
    }
}
