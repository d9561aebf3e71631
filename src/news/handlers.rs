use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::{AppError, AppResult},
    extract::{parse_id, ApiJson, ApiQuery},
    state::AppState,
};

use super::dto::{CreateNewsRequest, ListQuery, NewsListResponse, NewsResponse, UpdateNewsRequest};
use super::repo_types::{NewNews, NewsChanges, NewsFilter};

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/api/news", get(list_news).post(create_news))
        .route(
            "/api/news/:id",
            get(get_news).put(update_news).delete(delete_news),
        )
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(state, body))]
pub async fn create_news(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateNewsRequest>,
) -> AppResult<(StatusCode, Json<NewsResponse>)> {
    let Some(main_image) = non_empty(body.main_image) else {
        return Err(AppError::BadRequest("Main image is required".into()));
    };
    let (Some(title), Some(description)) = (non_empty(body.title), non_empty(body.description))
    else {
        return Err(AppError::BadRequest(
            "Title and description are required".into(),
        ));
    };

    let news = state
        .news
        .create(NewNews {
            title,
            description,
            category: non_empty(body.category),
            date: body.date,
            main_image,
            image1: non_empty(body.image1),
            image2: non_empty(body.image2),
            image3: non_empty(body.image3),
            created_by: Some(user_id),
        })
        .await?;

    info!(news_id = %news.id, %user_id, "news created");
    Ok((
        StatusCode::CREATED,
        Json(NewsResponse {
            status: "success",
            message: "News created successfully!".into(),
            news,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_news(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> AppResult<Json<NewsListResponse>> {
    if q.offset < 0 || q.limit.is_some_and(|l| l < 0) {
        return Err(AppError::BadRequest("Invalid limit/offset".into()));
    }
    let filter = NewsFilter {
        category: non_empty(q.category),
        limit: q.limit,
        offset: q.offset,
    };
    let news = state.news.list(&filter).await?;
    let message = if news.is_empty() {
        "There is no news in the database"
    } else {
        "news fetched!"
    };
    Ok(Json(NewsListResponse {
        status: "success",
        message: message.into(),
        news,
    }))
}

#[instrument(skip(state))]
pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<NewsResponse>> {
    let news_id = parse_id(&id)?;
    let news = state
        .news
        .find_by_id(news_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("news with this id: {id} not found")))?;
    Ok(Json(NewsResponse {
        status: "success",
        message: "news fetched!".into(),
        news,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_news(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateNewsRequest>,
) -> AppResult<Json<NewsResponse>> {
    let news_id = parse_id(&id)?;
    let changes = NewsChanges {
        title: non_empty(body.title),
        description: non_empty(body.description),
        date: body.date,
        main_image: non_empty(body.main_image),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }

    let news = state
        .news
        .update(news_id, changes)
        .await?
        .ok_or_else(|| {
            warn!(%news_id, "update of missing news");
            AppError::NotFound(format!("news with id: {id} not found"))
        })?;

    info!(%news_id, %user_id, "news updated");
    Ok(Json(NewsResponse {
        status: "success",
        message: "news update successfully".into(),
        news,
    }))
}

#[instrument(skip(state))]
pub async fn delete_news(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let news_id = parse_id(&id)?;
    if !state.news.delete(news_id).await? {
        return Err(AppError::NotFound(format!("news with id: {id} not found")));
    }
    info!(%news_id, %user_id, "news deleted");
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::success("News deleted successfully")),
    ))
}
