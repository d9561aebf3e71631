use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::news::repo_types::{NewNews, News, NewsChanges, NewsFilter};

#[async_trait]
pub trait NewsRepo: Send + Sync {
    async fn create(&self, new: NewNews) -> anyhow::Result<News>;
    /// Newest first.
    async fn list(&self, filter: &NewsFilter) -> anyhow::Result<Vec<News>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<News>>;
    async fn update(&self, id: Uuid, changes: NewsChanges) -> anyhow::Result<Option<News>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const NEWS_COLUMNS: &str = "id, title, description, category, date, main_image, image1, image2, \
                            image3, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgNewsRepo {
    db: PgPool,
}

impl PgNewsRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NewsRepo for PgNewsRepo {
    async fn create(&self, new: NewNews) -> anyhow::Result<News> {
        let sql = format!(
            r#"
            INSERT INTO news (title, description, category, date, main_image,
                              image1, image2, image3, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {NEWS_COLUMNS}
            "#
        );
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.category)
            .bind(new.date)
            .bind(&new.main_image)
            .bind(&new.image1)
            .bind(&new.image2)
            .bind(&new.image3)
            .bind(new.created_by)
            .fetch_one(&self.db)
            .await?;
        Ok(news)
    }

    async fn list(&self, filter: &NewsFilter) -> anyhow::Result<Vec<News>> {
        let sql = format!(
            r#"
            SELECT {NEWS_COLUMNS}
            FROM news
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, News>(&sql)
            .bind(&filter.category)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<News>> {
        let sql = format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = $1");
        let row = sqlx::query_as::<_, News>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: NewsChanges) -> anyhow::Result<Option<News>> {
        let sql = format!(
            r#"
            UPDATE news
               SET title       = COALESCE($2, title),
                   description = COALESCE($3, description),
                   date        = COALESCE($4, date),
                   main_image  = COALESCE($5, main_image),
                   updated_at  = now()
             WHERE id = $1
            RETURNING {NEWS_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, News>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.date)
            .bind(changes.main_image)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

/// Process-local store for development and tests, kept in insertion order.
#[derive(Default)]
pub struct InMemoryNewsRepo {
    items: RwLock<Vec<News>>,
}

impl InMemoryNewsRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsRepo for InMemoryNewsRepo {
    async fn create(&self, new: NewNews) -> anyhow::Result<News> {
        let now = OffsetDateTime::now_utc();
        let news = News {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            category: new.category,
            date: new.date,
            main_image: new.main_image,
            image1: new.image1,
            image2: new.image2,
            image3: new.image3,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        self.items.write().await.push(news.clone());
        Ok(news)
    }

    async fn list(&self, filter: &NewsFilter) -> anyhow::Result<Vec<News>> {
        let items = self.items.read().await;
        // Reverse first so equal timestamps still come out newest-inserted first.
        let mut rows: Vec<News> = items
            .iter()
            .rev()
            .filter(|n| match &filter.category {
                Some(c) => n.category.as_deref() == Some(c.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<News>> {
        Ok(self.items.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: NewsChanges) -> anyhow::Result<Option<News>> {
        let mut items = self.items.write().await;
        let Some(news) = items.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            news.title = title;
        }
        if let Some(description) = changes.description {
            news.description = description;
        }
        if let Some(date) = changes.date {
            news.date = Some(date);
        }
        if let Some(main_image) = changes.main_image {
            news.main_image = main_image;
        }
        news.updated_at = OffsetDateTime::now_utc();
        Ok(Some(news.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|n| n.id != id);
        Ok(items.len() != before)
    }
}
