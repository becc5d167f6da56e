use bytes::Bytes;
use canvas_core::{Course, Folder, RemoteFile};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::LINK;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

mod error;
pub mod link;

pub use error::{NetError, NetErrorKind};
pub use link::parse_link_header;

pub const COURSES_PATH: &str = "/courses";

pub fn course_folders_path(course_id: u64) -> String {
    format!("/courses/{course_id}/folders")
}

pub fn folder_files_path(folder_id: u64) -> String {
    format!("/folders/{folder_id}/files")
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub token: String,
    pub per_page: u32,
    /// Outbound request budget; `None` disables throttling.
    pub requests_per_second: Option<u32>,
    pub connect_timeout: Duration,
    /// Idle limit per read; a transfer may take any time while data flows.
    pub read_timeout: Duration,
}

impl ClientOptions {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: canvas_config::DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            per_page: canvas_config::DEFAULT_PAGE_SIZE,
            requests_per_second: Some(canvas_config::DEFAULT_REQUESTS_PER_SECOND),
            connect_timeout: Duration::from_secs(canvas_config::DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(canvas_config::DEFAULT_READ_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Build the shared reqwest client with the configured timeouts.
pub fn default_http_client(options: &ClientOptions) -> Result<Client, NetError> {
    Ok(Client::builder()
        .user_agent(concat!("canvas-sync/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(options.connect_timeout)
        .read_timeout(options.read_timeout)
        .build()?)
}

/// Fetches the full body behind a pre-authorized download URL.
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetError>;
}

/// Authenticated client for the Canvas REST API.
///
/// Every request carries the bearer token and, when configured, waits on a
/// shared rate limiter first.
pub struct CanvasClient {
    http: Client,
    base_url: String,
    token: String,
    per_page: u32,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl CanvasClient {
    pub fn new(options: ClientOptions) -> Result<Self, NetError> {
        let http = default_http_client(&options)?;
        Ok(Self::with_http_client(http, options))
    }

    pub fn with_http_client(http: Client, options: ClientOptions) -> Self {
        let limiter = options
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));
        Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            token: options.token,
            per_page: canvas_config::clamp_page_size(options.per_page),
            limiter,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, NetError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| NetError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, NetError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        debug!(%url, "GET");
        let resp = self.http.get(url).bearer_auth(&self.token).send().await?;
        Ok(resp)
    }

    /// Walk every page of a listing endpoint into one `Vec`, in page order.
    ///
    /// The initial request only establishes access and the `first` link; the
    /// pages themselves are then fetched by following `first` and `next`.
    /// Elements that do not deserialize into `T` are dropped with a warning.
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, NetError> {
        let url = self.endpoint(path)?;
        let resp = self.get(url.clone()).await?;
        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            return Err(NetError::AccessDenied {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(NetError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let links = page_links(&resp, &url)?;
        let first = links.get("first").ok_or_else(|| NetError::MissingRelation {
            rel: "first",
            url: url.to_string(),
        })?;
        let mut next = Some(resolve_link(&url, first)?);

        let mut items = Vec::new();
        let mut pages = 0usize;
        while let Some(page_url) = next.take() {
            let resp = self.get(page_url.clone()).await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(NetError::Status {
                    status: status.as_u16(),
                    url: page_url.to_string(),
                });
            }

            let links = page_links(&resp, &page_url)?;
            let body = resp.bytes().await?;
            items.extend(decode_page::<T>(&body, &page_url)?);
            pages += 1;

            next = match links.get("next") {
                Some(href) => Some(resolve_link(&page_url, href)?),
                None => None,
            };
        }

        debug!(path, pages, items = items.len(), "listing complete");
        Ok(items)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, NetError> {
        self.list_all(COURSES_PATH).await
    }

    pub async fn list_folders(&self, course_id: u64) -> Result<Vec<Folder>, NetError> {
        self.list_all(&course_folders_path(course_id)).await
    }

    pub async fn list_files(&self, folder_id: u64) -> Result<Vec<RemoteFile>, NetError> {
        self.list_all(&folder_files_path(folder_id)).await
    }

    /// Download a whole body into memory.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, NetError> {
        let parsed = Url::parse(url).map_err(|e| NetError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let resp = self.get(parsed).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?)
    }
}

#[async_trait::async_trait]
impl ContentFetcher for CanvasClient {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetError> {
        self.fetch_bytes(url).await
    }
}

fn page_links(
    resp: &Response,
    url: &Url,
) -> Result<std::collections::HashMap<String, String>, NetError> {
    let header = resp
        .headers()
        .get(LINK)
        .ok_or_else(|| NetError::MissingLinkHeader {
            url: url.to_string(),
        })?;
    let value = header
        .to_str()
        .map_err(|_| NetError::MalformedLinkHeader {
            section: String::from_utf8_lossy(header.as_bytes()).into_owned(),
        })?;
    parse_link_header(value)
}

/// Canvas emits absolute links; relative ones are resolved against the page
/// that carried them.
fn resolve_link(current: &Url, href: &str) -> Result<Url, NetError> {
    Url::parse(href)
        .or_else(|_| current.join(href))
        .map_err(|e| NetError::InvalidUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })
}

fn decode_page<T: DeserializeOwned>(body: &[u8], url: &Url) -> Result<Vec<T>, NetError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|source| NetError::Decode {
            url: url.to_string(),
            source,
        })?;

    let mut items = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<T>(value) {
            Ok(item) => items.push(item),
            Err(e) => warn!(%url, "dropping invalid record: {e}"),
        }
    }
    Ok(items)
}
