use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::news::repo_types::News;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub main_image: Option<String>,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub image3: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub main_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub status: &'static str,
    pub message: String,
    pub news: News,
}

#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub status: &'static str,
    pub message: String,
    pub news: Vec<News>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_camel_case_and_rfc3339() {
        let req: CreateNewsRequest = serde_json::from_str(
            r#"{"title":"t","description":"d","mainImage":"uploads/a.jpg","date":"2025-03-01T09:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.main_image.as_deref(), Some("uploads/a.jpg"));
        assert_eq!(req.date.unwrap().year(), 2025);
        assert!(req.category.is_none());
    }

    #[test]
    fn update_request_allows_missing_date() {
        let req: UpdateNewsRequest = serde_json::from_str(r#"{"title":"new"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("new"));
        assert!(req.date.is_none());
    }
}
