use thiserror::Error;

use crate::gateway::{FailureKind, FetchFailure};

/// Enumerates the possible errors that can arise while extracting tags from a post page.
///
/// Every variant maps to a distinct outcome at the HTTP boundary, so callers can tell a bad
/// request apart from an upstream failure without inspecting the message.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The target is not an absolute `http`/`https` URL.
    #[error("Invalid target URL provided: {url}")]
    InvalidUrl { url: String },

    /// No site profile claims the URL and the generic fallback was not allowed.
    #[error("URL does not match supported sites/formats: {host}")]
    UnsupportedSite { host: String },

    /// The target site answered with a non-2xx status.
    #[error("Failed to fetch page from target site. Status: {status}")]
    UpstreamHttp { status: u16 },

    /// The fetch exceeded its deadline.
    #[error("Request to target site timed out")]
    Timeout,

    /// DNS, connection or other transport failure.
    #[error("Network error fetching page: {message}")]
    Unreachable { message: String },

    /// The target site answered 2xx with an empty body.
    #[error("Received empty page response from target site")]
    EmptyResponse,

    /// The page is a challenge, captcha or login wall instead of a post.
    #[error("Extraction failed: {reason}")]
    BlockedPage { reason: String },

    /// The underlying HTTP client could not be initialized.
    #[error("Failed to build HTTP client")]
    ClientBuild(#[from] reqwest::Error),
}

impl From<FetchFailure> for ExtractorError {
    fn from(failure: FetchFailure) -> Self {
        match failure.kind {
            FailureKind::Timeout => Self::Timeout,
            FailureKind::UpstreamHttp => Self::UpstreamHttp {
                status: failure.status.unwrap_or_default(),
            },
            FailureKind::Unreachable => Self::Unreachable {
                message: failure.message,
            },
            FailureKind::EmptyResponse => Self::EmptyResponse,
        }
    }
}

/// Errors raised while loading site profiles. Any of these aborts startup.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Two profiles claim the same host and nothing in the URL path tells them apart.
    #[error("Host {host} is claimed by both {first} and {second} without distinct path patterns")]
    AmbiguousHost {
        host: String,
        first: String,
        second: String,
    },

    /// A CSS selector in a profile failed to parse.
    #[error("Invalid selector `{selector}` in profile {profile}: {reason}")]
    InvalidSelector {
        profile: String,
        selector: String,
        reason: String,
    },

    /// A profile's path pattern is not a valid regular expression.
    #[error("Invalid path pattern in profile {profile}: {source}")]
    InvalidPattern {
        profile: String,
        #[source]
        source: regex::Error,
    },

    /// A profile declares no hostnames at all.
    #[error("Profile {profile} does not declare any host")]
    NoHosts { profile: String },

    #[error("Failed to access site catalog file: {source}")]
    CatalogIo {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse site catalog file: {source}")]
    CatalogParse {
        #[from]
        source: toml::de::Error,
    },
}
