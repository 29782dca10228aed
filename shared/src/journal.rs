//! Journal service client.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::upstream::{into_lookup, segment, Lookup, UpstreamClient};
use crate::Result;

/// Journal entry sent to the journal service on creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewJournalEntry {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub tags: Vec<String>,
}

/// Filters for listing a user's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalListing {
    pub page: u32,
    pub page_size: u32,
    pub tag: Option<String>,
    pub mood: Option<String>,
}

impl Default for JournalListing {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            tag: None,
            mood: None,
        }
    }
}

/// Client for journal CRUD on the journal service.
#[derive(Debug, Clone)]
pub struct JournalClient {
    upstream: UpstreamClient,
    timeout: Duration,
    create_timeout: Duration,
}

impl JournalClient {
    pub fn new(upstream: UpstreamClient, timeout: Duration, create_timeout: Duration) -> Self {
        Self {
            upstream,
            timeout,
            create_timeout,
        }
    }

    fn entry_path(user_id: &str, entry_id: &str) -> String {
        format!("/journal/{}/{}", segment(user_id), segment(entry_id))
    }

    /// Create a journal entry.
    pub async fn create(&self, entry: &NewJournalEntry) -> Result<Value> {
        let request = self.upstream.request(Method::POST, "/journal").json(entry);
        self.upstream
            .send(request, self.create_timeout)
            .await
            .map_err(|e| e.into_error("Failed to create journal entry"))
    }

    /// List a user's entries.
    pub async fn list(&self, user_id: &str, listing: &JournalListing) -> Result<Value> {
        let mut params = vec![
            ("page", listing.page.to_string()),
            ("page_size", listing.page_size.to_string()),
        ];
        if let Some(tag) = &listing.tag {
            params.push(("tag", tag.clone()));
        }
        if let Some(mood) = &listing.mood {
            params.push(("mood", mood.clone()));
        }

        let request = self
            .upstream
            .request(Method::GET, &format!("/journal/{}", segment(user_id)))
            .query(&params);
        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error("Failed to list journal entries"))
    }

    /// Search a user's entries.
    pub async fn search(&self, user_id: &str, query: &str, limit: u32) -> Result<Value> {
        let request = self
            .upstream
            .request(Method::GET, &format!("/journal/{}/search", segment(user_id)))
            .query(&[("query", query.to_string()), ("limit", limit.to_string())]);
        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error("Failed to search journal entries"))
    }

    /// Fetch one entry.
    pub async fn get(&self, user_id: &str, entry_id: &str) -> Result<Lookup<Value>> {
        let request = self
            .upstream
            .request(Method::GET, &Self::entry_path(user_id, entry_id));
        into_lookup(
            self.upstream.send(request, self.timeout).await,
            "Failed to get journal entry",
        )
    }

    /// Apply a partial update to one entry.
    pub async fn update(&self, user_id: &str, entry_id: &str, updates: &Value) -> Result<Lookup<Value>> {
        let request = self
            .upstream
            .request(Method::PUT, &Self::entry_path(user_id, entry_id))
            .json(updates);
        into_lookup(
            self.upstream.send(request, self.timeout).await,
            "Failed to update journal entry",
        )
    }

    /// Delete one entry.
    pub async fn delete(&self, user_id: &str, entry_id: &str) -> Result<Lookup<()>> {
        let request = self
            .upstream
            .request(Method::DELETE, &Self::entry_path(user_id, entry_id));
        let result = self
            .upstream
            .send::<Value>(request, self.timeout)
            .await
            .map(|_| ());
        into_lookup(result, "Failed to delete journal entry")
    }
}
