use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// News article as stored and returned.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub main_image: String,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub main_image: String,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Partial update; `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct NewsChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub main_image: Option<String>,
}

impl NewsChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.main_image.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    pub category: Option<String>,
    /// `None` returns everything.
    pub limit: Option<i64>,
    pub offset: i64,
}
