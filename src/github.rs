//! # GitHub API Client
//!
//! Minimal blocking client for the three GitHub REST calls the autoupdate
//! workflow performs: fetching the latest release of an upstream project,
//! listing pull requests by head branch, and opening a pull request.
//!
//! Every request carries a fixed 10-second timeout; failures are wrapped
//! into [`Error::RemoteApi`] with the request URL and surfaced without
//! retrying, including rate-limit responses.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("image-mirror/", env!("CARGO_PKG_VERSION"));

/// An existing pull request, as returned by the list and create endpoints.
/// Only the fields this tool consumes are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
    #[serde(default)]
    pub number: u64,
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub maintainer_can_modify: bool,
}

/// A project release. Only the tag name matters here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

/// Blocking GitHub REST client.
///
/// Unauthenticated when no token is supplied (sufficient for read-only
/// dry runs); mutating calls require a token.
pub struct GithubClient {
    http: Client,
    token: Option<String>,
    api_base: String,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Construct a client against a non-default API base URL. Tests point
    /// this at a local server.
    pub fn with_api_base(token: Option<String>, api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::RemoteApi {
                url: api_base.clone(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(GithubClient {
            http,
            token,
            api_base,
        })
    }

    /// `GET /repos/{owner}/{repo}/releases/latest`
    pub fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base, owner, repo
        );
        self.send(self.http.get(&url), &url)
    }

    /// `GET /repos/{owner}/{repo}/pulls?head=<head>&state=all`
    ///
    /// `head` must be in `<owner>:<branch>` form; a bare branch name matches
    /// nothing on this endpoint.
    pub fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
    ) -> Result<Vec<PullRequest>> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_base, owner, repo);
        self.send(
            self.http
                .get(&url)
                .query(&[("head", head), ("state", "all")]),
            &url,
        )
    }

    /// `POST /repos/{owner}/{repo}/pulls`
    pub fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_base, owner, repo);
        self.send(self.http.post(&url).json(pull_request), &url)
    }

    fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let mut request = request.header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| Error::RemoteApi {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::RemoteApi {
                url: url.to_string(),
                message: format!("status {}: {}", status, body.trim()),
            });
        }

        response.json().map_err(|e| Error::RemoteApi {
            url: url.to_string(),
            message: format!("failed to parse response: {}", e),
        })
    }
}
