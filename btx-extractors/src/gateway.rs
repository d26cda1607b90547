//! Outbound HTTP for page, image and probe requests.
//!
//! Every request carries a browser user agent and a `Referer` pointing at the target's own
//! origin, since several boorus refuse hotlinked or refererless traffic. Failures are
//! classified into a small closed set ([`FailureKind`]) and never retried here.
use std::{future::Future, time::Duration};

use bytes::Bytes;
use log::debug;
use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, PRAGMA, REFERER, USER_AGENT},
    Client, StatusCode,
};
use url::Url;

use crate::{error::ExtractorError, extractor_config::BROWSER_UA};

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BINARY_ACCEPT: &str = "image/avif,image/webp,image/*,video/*,*/*;q=0.8";
const PIXIV_REFERER: &str = "https://www.pixiv.net/";

pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(25);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    UpstreamHttp,
    Unreachable,
    EmptyResponse,
}

/// Why a fetch produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    /// Upstream status, set for `UpstreamHttp`.
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            status: None,
            message: String::from("request timed out"),
        }
    }

    pub fn upstream(status: StatusCode) -> Self {
        Self {
            kind: FailureKind::UpstreamHttp,
            status: Some(status.as_u16()),
            message: format!("HTTP {}", status.as_u16()),
        }
    }

    pub fn unreachable(message: &str) -> Self {
        Self {
            kind: FailureKind::Unreachable,
            status: None,
            message: message.to_string(),
        }
    }

    pub fn empty() -> Self {
        Self {
            kind: FailureKind::EmptyResponse,
            status: None,
            message: String::from("empty response body"),
        }
    }

    fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout()
        } else {
            Self::unreachable(&err.to_string())
        }
    }
}

/// A successfully fetched body.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// URL after redirects.
    pub final_url: Url,
}

impl FetchedBody {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub type FetchOutcome = Result<FetchedBody, FetchFailure>;

/// HTTP method used by a reachability probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Anything able to hand back the HTML of a post page.
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send;
}

/// Returns the `Referer` sent along with a request to `url`.
pub fn referer_for(url: &Url) -> String {
    match url.host_str() {
        Some(host) if host == "pximg.net" || host.ends_with(".pximg.net") => {
            PIXIV_REFERER.to_string()
        }
        _ => format!("{}/", url.origin().ascii_serialization()),
    }
}

/// Browser-like HTTP client shared by the extractor, the image proxy and the health probes.
#[derive(Debug, Clone)]
pub struct FetchGateway {
    client: Client,
    user_agent: String,
    page_timeout: Duration,
}

impl FetchGateway {
    pub fn new() -> Result<Self, ExtractorError> {
        Self::with_options(BROWSER_UA, DEFAULT_PAGE_TIMEOUT)
    }

    pub fn with_options(user_agent: &str, page_timeout: Duration) -> Result<Self, ExtractorError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            page_timeout,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub const fn page_timeout(&self) -> Duration {
        self.page_timeout
    }

    /// Fetches a post page, always revalidating with the origin.
    pub async fn fetch_page(&self, url: &Url) -> FetchOutcome {
        debug!("Fetching page {url}");

        let request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, PAGE_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(REFERER, referer_for(url))
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .timeout(self.page_timeout);

        self.send(request).await
    }

    /// Fetches image or video bytes. Upstream caching is left alone.
    pub async fn fetch_binary(&self, url: &Url) -> FetchOutcome {
        debug!("Fetching binary {url}");

        let request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, BINARY_ACCEPT)
            .header(REFERER, referer_for(url))
            .timeout(self.page_timeout);

        self.send(request).await
    }

    /// Sends a single reachability request and reports the status code.
    ///
    /// Non-2xx answers are not failures here; only timeouts and transport errors are.
    pub async fn probe(
        &self,
        url: &Url,
        method: ProbeMethod,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<u16, FetchFailure> {
        let builder = match method {
            ProbeMethod::Head => self.client.head(url.clone()),
            ProbeMethod::Get => self.client.get(url.clone()),
        };

        let response = builder
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, PAGE_ACCEPT)
            .header(REFERER, referer_for(url))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchFailure::from_transport(&e))?;

        debug!("Probe {method:?} {url} -> {}", response.status());
        Ok(response.status().as_u16())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> FetchOutcome {
        let response = request
            .send()
            .await
            .map_err(|e| FetchFailure::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Upstream answered {status} for {}", response.url());
            return Err(FetchFailure::upstream(status));
        }

        let final_url = response.url().clone();
        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let cache_control = header(CACHE_CONTROL);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::from_transport(&e))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchFailure::empty());
        }

        debug!("Received {} bytes from {final_url}", body.len());

        Ok(FetchedBody {
            body,
            content_type,
            cache_control,
            final_url,
        })
    }
}

impl PageSource for FetchGateway {
    fn fetch_page(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send {
        FetchGateway::fetch_page(self, url)
    }
}
