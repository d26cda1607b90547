//! Reachability probes and the escalation ladder they follow.
use std::{future::Future, time::Duration};

use btx_common::{log::debug, Status};
use btx_extractors::gateway::{FailureKind, FetchFailure, FetchGateway, ProbeMethod};
use url::Url;

use super::ProbeTarget;

/// Final answer of a probe: the last status code seen, or the transport failure that ended it.
pub type ProbeOutcome = Result<u16, FetchFailure>;

/// Something able to check whether a site answers.
pub trait Probe: Send + Sync {
    fn probe(&self, target: &ProbeTarget) -> impl Future<Output = ProbeOutcome> + Send;
}

const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

const fn needs_get(status: u16) -> bool {
    matches!(status, 401 | 403 | 405)
}

const fn is_blocked(status: u16) -> bool {
    matches!(status, 403 | 503)
}

/// Maps a probe outcome onto a site status and an optional error message.
pub fn classify(outcome: &ProbeOutcome) -> (Status, Option<String>) {
    match outcome {
        Ok(code) if is_success(*code) => (Status::Operational, None),
        Ok(429) => (Status::Degraded, Some(String::from("Rate limited"))),
        Ok(code @ (502 | 503 | 504)) => (Status::MajorOutage, Some(format!("HTTP {code}"))),
        Ok(404) => (Status::PartialOutage, Some(String::from("HTTP 404"))),
        Ok(code) => (Status::Degraded, Some(format!("HTTP {code}"))),
        Err(failure) if failure.kind == FailureKind::Timeout => {
            (Status::Degraded, Some(String::from("Timed out")))
        }
        Err(failure) => (Status::MajorOutage, Some(failure.message.clone())),
    }
}

/// Probes over HTTP through the [`FetchGateway`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    gateway: FetchGateway,
    browser_ua: String,
    bot_ua: String,
    timeout: Duration,
}

impl HttpProbe {
    /// # Arguments
    /// * `browser_ua`: user agent of the first attempts.
    /// * `bot_ua`: crawler user agent tried once the browser one is refused.
    /// * `timeout`: deadline of every single request.
    pub fn new(gateway: FetchGateway, browser_ua: &str, bot_ua: &str, timeout: Duration) -> Self {
        Self {
            gateway,
            browser_ua: browser_ua.to_string(),
            bot_ua: bot_ua.to_string(),
            timeout,
        }
    }

    async fn attempt(&self, url: &Url, method: ProbeMethod, user_agent: &str) -> ProbeOutcome {
        self.gateway.probe(url, method, user_agent, self.timeout).await
    }

    /// HEAD, then GET on access or method refusals, then the mirror host, then the bot UA.
    async fn ladder(&self, target: &ProbeTarget) -> ProbeOutcome {
        let url = &target.url;

        let mut status = self.attempt(url, ProbeMethod::Head, &self.browser_ua).await?;
        if is_success(status) {
            return Ok(status);
        }

        if needs_get(status) {
            status = self.attempt(url, ProbeMethod::Get, &self.browser_ua).await?;
        }
        if !is_blocked(status) {
            return Ok(status);
        }

        if let Some(mirror) = target.mirror_url() {
            debug!("{} refused with {status}, trying mirror {mirror}", target.name);
            status = self.attempt(&mirror, ProbeMethod::Get, &self.browser_ua).await?;
            if !is_blocked(status) {
                return Ok(status);
            }
        }

        debug!("{} still refused with {status}, switching user agent", target.name);
        status = self.attempt(url, ProbeMethod::Head, &self.bot_ua).await?;
        if needs_get(status) {
            status = self.attempt(url, ProbeMethod::Get, &self.bot_ua).await?;
        }

        Ok(status)
    }
}

impl Probe for HttpProbe {
    fn probe(&self, target: &ProbeTarget) -> impl Future<Output = ProbeOutcome> + Send {
        self.ladder(target)
    }
}
