//! REST client for the `/users` collection.
//!
//! `UserApi` is the seam the page controller talks to; `HttpUserApi` is the
//! reqwest-backed implementation used at runtime.

use crate::model::{ClientConfig, User};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {0} cannot carry a path")]
    OpaqueBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}")]
    Status {
        method: Method,
        url: Url,
        status: StatusCode,
    },
    #[error("unreadable response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("user has no id")]
    MissingId,
}

impl ApiError {
    /// This error followed by its sources, joined with `: `. Sources already
    /// spelled out by an outer message are skipped.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let msg = err.to_string();
            if !out.contains(&msg) {
                out.push_str(": ");
                out.push_str(&msg);
            }
            source = err.source();
        }
        out
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> ApiResult<Vec<User>>;
    async fn create_user(&self, user: &User) -> ApiResult<()>;
    async fn update_user(&self, user: &User) -> ApiResult<()>;
    async fn delete_user(&self, id: &str) -> ApiResult<()>;
}

pub struct HttpUserApi {
    http: Client,
    base: Url,
}

impl HttpUserApi {
    pub fn new(cfg: &ClientConfig) -> ApiResult<Self> {
        let base = Url::parse(&cfg.base_url).map_err(|source| ApiError::BaseUrl {
            url: cfg.base_url.clone(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::OpaqueBaseUrl(cfg.base_url.clone()));
        }

        let mut builder = Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self { http, base })
    }

    /// `<base>/users[/<id>]`, with the id percent-encoded as a single segment.
    fn users_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&User>,
    ) -> ApiResult<reqwest::Response> {
        tracing::debug!(%method, %url, "sending request");
        let mut req = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                url,
                status,
            });
        }
        tracing::debug!(%method, %url, %status, "request completed");
        Ok(res)
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let url = self.users_url(None);
        let res = self.send(Method::GET, url.clone(), None).await?;
        res.json::<Vec<User>>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn create_user(&self, user: &User) -> ApiResult<()> {
        self.send(Method::POST, self.users_url(None), Some(user))
            .await?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> ApiResult<()> {
        let id = user.id.as_deref().ok_or(ApiError::MissingId)?;
        self.send(Method::PATCH, self.users_url(Some(id)), Some(user))
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        self.send(Method::DELETE, self.users_url(Some(id)), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
