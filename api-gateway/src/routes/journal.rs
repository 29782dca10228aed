//! Journal routes. Entries are always scoped to the authenticated caller.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::http::{parse_json_body, positive_or, require};
use shared::{Claims, Error, JournalListing, Lookup, NewJournalEntry, Result};
use tracing::info;
use validator::Validate;

use crate::extract::Query;
use crate::AppState;

const NOT_FOUND: &str = "Journal entry not found";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub content: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub tag: Option<String>,
    pub mood: Option<String>,
}

impl ListParams {
    fn into_listing(self) -> JournalListing {
        let defaults = JournalListing::default();
        JournalListing {
            page: positive_or(self.page.as_deref(), defaults.page),
            page_size: positive_or(self.page_size.as_deref(), defaults.page_size),
            tag: self.tag.filter(|t| !t.is_empty()),
            mood: self.mood.filter(|m| !m.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(required, length(min = 1))]
    pub q: Option<String>,
    pub limit: Option<String>,
}

fn found<T>(lookup: Lookup<T>) -> Result<T> {
    match lookup {
        Lookup::Found(value) => Ok(value),
        Lookup::NotFound => Err(Error::NotFound(NOT_FOUND.to_string())),
    }
}

/// POST /api/journal
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let request: CreateEntryRequest = parse_json_body(&body)?;
    require(&request, "Title and content are required")?;

    let entry = NewJournalEntry {
        user_id: caller.user_id,
        title: request.title.unwrap_or_default(),
        content: request.content.unwrap_or_default(),
        mood: request.mood,
        tags: request.tags.unwrap_or_default(),
    };
    let created = state.journal.create(&entry).await?;
    info!(user_id = %entry.user_id, "Created journal entry");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/journal?page&pageSize&tag&mood
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let listing = params.into_listing();
    Ok(Json(state.journal.list(&caller.user_id, &listing).await?))
}

/// GET /api/journal/search?q&limit
pub async fn search_entries(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>> {
    require(&params, "Search query is required")?;
    let query = params.q.as_deref().unwrap_or_default();
    let limit = positive_or(params.limit.as_deref(), 5);

    Ok(Json(state.journal.search(&caller.user_id, query, limit).await?))
}

/// GET /api/journal/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Path(entry_id): Path<String>,
) -> Result<Json<Value>> {
    let entry = found(state.journal.get(&caller.user_id, &entry_id).await?)?;
    Ok(Json(entry))
}

/// PUT /api/journal/{id}
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Path(entry_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>> {
    let updates: Value = parse_json_body(&body)?;
    let entry = found(
        state
            .journal
            .update(&caller.user_id, &entry_id, &updates)
            .await?,
    )?;
    Ok(Json(entry))
}

/// DELETE /api/journal/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Path(entry_id): Path<String>,
) -> Result<Json<Value>> {
    found(state.journal.delete(&caller.user_id, &entry_id).await?)?;
    info!(user_id = %caller.user_id, entry_id = %entry_id, "Deleted journal entry");
    Ok(Json(json!({ "message": "Journal entry deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_defaults() {
        let params = ListParams {
            page: None,
            page_size: Some("abc".to_string()),
            tag: Some(String::new()),
            mood: Some("calm".to_string()),
        };
        assert_eq!(
            params.into_listing(),
            JournalListing {
                page: 1,
                page_size: 10,
                tag: None,
                mood: Some("calm".to_string()),
            }
        );
    }
}
