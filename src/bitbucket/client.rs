use chrono::{Duration, Utc};
use log::debug;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::Credentials;
use crate::error::{PipescopeError, Result};

use super::types::{Pipeline, Repository};

/// Page size hint sent with every collection request.
pub(super) const PAGE_SIZE: u32 = 100;

/// Bitbucket Cloud REST API client.
///
/// Owns a single `reqwest::Client` reused across calls and applies Basic
/// auth from the configured credentials to every request.
#[derive(Debug)]
pub struct BitbucketClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

/// Result of a paginated fetch: either the concatenation of every page's
/// `values`, or the raw body for endpoints that return a single object.
#[derive(Debug)]
pub enum FetchOutcome {
    Items(Vec<Value>),
    Single(Value),
}

impl FetchOutcome {
    fn into_items(self, endpoint: &str) -> Result<Vec<Value>> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Single(_) => Err(PipescopeError::UnexpectedShape(format!(
                "{endpoint} returned a single object where a paged collection was expected"
            ))),
        }
    }
}

impl BitbucketClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipescope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipescopeError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last path segment unless the base ends with a
        // slash.
        let mut base = base_url.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| PipescopeError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(
            self.credentials.username(),
            Some(self.credentials.app_password()),
        )
    }

    /// Fetch `path`, following `next` cursors until the collection is
    /// exhausted.
    ///
    /// Paged bodies look like `{ "values": [...], "size": n, "next": url }`.
    /// Three shapes terminate the walk:
    /// - no `next` cursor: return everything accumulated so far;
    /// - a declared `size` of zero: return an empty collection without
    ///   issuing further requests;
    /// - a body that is not a paged collection at all: return it verbatim.
    ///
    /// The `next` cursor is a fully-formed URL that already encodes the
    /// query for its page, so the original query parameters are only sent
    /// with the first request.
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<FetchOutcome> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PipescopeError::Config(format!("Invalid request path {path}: {e}")))?;
        let mut query = Some(query);
        let mut items = Vec::new();

        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(query) = query {
                request = request.query(query);
            }

            let response = self.auth_request(request).send().await?;
            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(PipescopeError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: Value = response.json().await?;

            match body.get("values").and_then(Value::as_array) {
                Some(values) if !values.is_empty() => {
                    debug!("Fetched {} items from {url}", values.len());
                    items.extend(values.iter().cloned());
                }
                _ => {
                    if body.get("size").and_then(Value::as_u64) == Some(0) {
                        return Ok(FetchOutcome::Items(Vec::new()));
                    }
                    return Ok(FetchOutcome::Single(body));
                }
            }

            match body.get("next").and_then(Value::as_str) {
                Some(next) => {
                    url = Url::parse(next).map_err(|e| {
                        PipescopeError::UnexpectedShape(format!("Invalid next cursor {next}: {e}"))
                    })?;
                    query = None;
                }
                None => break,
            }
        }

        Ok(FetchOutcome::Items(items))
    }

    /// Repositories in the workspace updated within the last
    /// `updated_within_days` days.
    pub async fn list_repositories(
        &self,
        workspace: &str,
        updated_within_days: i64,
    ) -> Result<Vec<Repository>> {
        let cutoff = (Utc::now() - Duration::days(updated_within_days)).format("%Y-%m-%d");
        let pagelen = PAGE_SIZE.to_string();
        let filter = format!("updated_on>={cutoff}");

        let path = format!("repositories/{workspace}");
        let outcome = self
            .fetch(
                Method::GET,
                &path,
                &[("pagelen", pagelen.as_str()), ("q", filter.as_str())],
            )
            .await?;

        deserialize_items(outcome.into_items(&path)?)
    }

    /// Pipelines for one repository, newest first.
    pub async fn list_pipelines(&self, workspace: &str, slug: &str) -> Result<Vec<Pipeline>> {
        let pagelen = PAGE_SIZE.to_string();

        let path = format!("repositories/{workspace}/{slug}/pipelines/");
        let outcome = self
            .fetch(
                Method::GET,
                &path,
                &[("pagelen", pagelen.as_str()), ("sort", "-created_on")],
            )
            .await?;

        deserialize_items(outcome.into_items(&path)?)
    }
}

fn deserialize_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Into::into))
        .collect()
}
