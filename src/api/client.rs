use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::response::ApiResponse;
use super::types::{NewBoxer, SortBy};

/// Blocking client for the boxing API. One request in flight at a time.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// `base` must end with `/` (see `Config`), e.g. `http://localhost:5000/api/`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("boxing-smoketest/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint path (optionally with a query) under the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid endpoint path {path:?}"))
    }

    fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let url = self.endpoint_url(path)?;
        let mut req = self.http.request(method.clone(), url.clone());
        req = match body {
            Some(json) => req.json(&json),
            None => req.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };

        let started = Instant::now();
        let resp = req
            .send()
            .with_context(|| format!("{method} {url} failed"))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .with_context(|| format!("{method} {url}: failed to read response body"))?;
        debug!(
            %method,
            %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api call"
        );
        Ok(ApiResponse { status, body })
    }

    pub fn health(&self) -> Result<ApiResponse> {
        self.send(Method::GET, "health", None)
    }

    pub fn db_check(&self) -> Result<ApiResponse> {
        self.send(Method::GET, "db-check", None)
    }

    pub fn create_boxer(&self, boxer: &NewBoxer) -> Result<ApiResponse> {
        let body = serde_json::to_value(boxer).context("failed to encode boxer")?;
        self.send(Method::POST, "create-boxer", Some(body))
    }

    pub fn delete_boxer(&self, id: i64) -> Result<ApiResponse> {
        self.send(Method::DELETE, &format!("delete-boxer/{id}"), None)
    }

    pub fn get_boxer_by_id(&self, id: i64) -> Result<ApiResponse> {
        self.send(Method::GET, &format!("get-boxer-by-id/{id}"), None)
    }

    pub fn get_boxer_by_name(&self, name: &str) -> Result<ApiResponse> {
        let path = format!("get-boxer-by-name?name={}", urlencoding::encode(name));
        self.send(Method::GET, &path, None)
    }

    pub fn get_leaderboard(&self, sort_by: SortBy) -> Result<ApiResponse> {
        let path = format!("get-leaderboard?sort_by={}", urlencoding::encode(sort_by.as_str()));
        self.send(Method::GET, &path, None)
    }

    pub fn enter_ring(&self, id: i64) -> Result<ApiResponse> {
        self.send(Method::POST, &format!("enter-boxer-into-ring/{id}"), None)
    }

    pub fn get_boxers_in_ring(&self) -> Result<ApiResponse> {
        self.send(Method::GET, "get-boxers-in-ring", None)
    }

    pub fn clear_ring(&self) -> Result<ApiResponse> {
        self.send(Method::POST, "clear-ring", None)
    }

    pub fn fight(&self) -> Result<ApiResponse> {
        self.send(Method::POST, "fight", None)
    }
}
