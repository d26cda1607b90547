//! Extraction orchestrator.
//! # Flow
//!
//! [`TagExtractor::extract`] validates the target URL, asks the [`SiteRegistry`] which site
//! profile claims it, fetches the page through a [`PageSource`] and hands the HTML to the
//! profile parser, or to the [generic fallback](crate::generic) when the caller allowed
//! unsupported sites.
//!
//! The extractor keeps no per-request state, so a single instance can serve any number of
//! concurrent requests. Nothing is retried here.
use std::sync::Arc;

use btx_common::{ExtractionRequest, ExtractionResult};
use log::{debug, info, warn};
use scraper::Html;
use url::Url;

use crate::{
    blacklist::TagBlacklist,
    error::ExtractorError,
    gateway::{FetchGateway, PageSource},
    generic::parse_generic_document,
    parser::{detect_blocked, parse_document},
    registry::{normalize_host, SiteProfile, SiteRegistry},
};

/// Turns post URLs into categorized tag sets.
#[derive(Debug, Clone)]
pub struct TagExtractor<S = FetchGateway> {
    registry: Arc<SiteRegistry>,
    source: S,
    blacklist: TagBlacklist,
}

impl<S: PageSource> TagExtractor<S> {
    pub fn new(registry: Arc<SiteRegistry>, source: S) -> Self {
        Self {
            registry,
            source,
            blacklist: TagBlacklist::default(),
        }
    }

    /// Sets a blacklist merged into the one of every request.
    #[must_use]
    pub fn with_blacklist(mut self, blacklist: TagBlacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Runs the whole pipeline for one request.
    ///
    /// # Errors
    /// * [`ExtractorError::InvalidUrl`] for anything but an absolute `http`/`https` URL.
    /// * [`ExtractorError::UnsupportedSite`] when no profile matches and the fallback is off.
    /// * The fetch errors ([`UpstreamHttp`](ExtractorError::UpstreamHttp),
    ///   [`Timeout`](ExtractorError::Timeout), [`Unreachable`](ExtractorError::Unreachable),
    ///   [`EmptyResponse`](ExtractorError::EmptyResponse)).
    /// * [`ExtractorError::BlockedPage`] when a supported site served a challenge or login wall.
    ///   The generic fallback only attaches a warning.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractorError> {
        let url = validate_url(&request.target_url)?;

        let profile = self.registry.resolve(&url);
        match profile {
            Some(profile) => info!("Extracting tags from {} post {url}", profile.name),
            None if request.allow_unsupported_sites => {
                info!("No site profile for {url}, using the generic extractor");
            }
            None => {
                let host = url.host_str().map(normalize_host).unwrap_or_default();
                debug!("Rejecting unsupported host {host}");
                return Err(ExtractorError::UnsupportedSite { host });
            }
        }

        let fetched = self.source.fetch_page(&url).await?;
        let blacklist = self.blacklist.merged(&request.blacklist);

        let result = parse_page(&fetched.text(), &fetched.final_url, profile, &blacklist)?;
        debug!(
            "Extracted {} tags from {} ({} warnings)",
            result.tag_count(),
            result.site_name,
            result.warnings.len()
        );

        Ok(result)
    }
}

fn validate_url(raw: &str) -> Result<Url, ExtractorError> {
    let invalid = || ExtractorError::InvalidUrl {
        url: raw.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }

    Ok(url)
}

/// Parses the fetched HTML. Kept synchronous since parsed documents are not `Send`.
fn parse_page(
    html: &str,
    page_url: &Url,
    profile: Option<&SiteProfile>,
    blacklist: &TagBlacklist,
) -> Result<ExtractionResult, ExtractorError> {
    let document = Html::parse_document(html);
    let blocked = detect_blocked(&document);

    let Some(profile) = profile else {
        let mut result = parse_generic_document(&document, page_url, blacklist);
        if let Some(reason) = blocked {
            warn!("{page_url} looks like a blocked page: {reason}");
            result.add_warning(&format!("Page may be blocked: {reason}"));
        }
        return Ok(result);
    };

    if let Some(reason) = blocked {
        warn!("{page_url} served a blocked page: {reason}");
        return Err(ExtractorError::BlockedPage { reason });
    }

    Ok(parse_document(&document, page_url, profile, blacklist))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        extractor_config::{ProfileSpec, TagRuleSpec},
        gateway::{FetchFailure, FetchOutcome, FetchedBody},
    };
    use btx_common::{extraction::UNSUPPORTED_SITE_WARNING, TagCategory};
    use bytes::Bytes;
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use std::{
        collections::BTreeMap,
        future::Future,
        sync::atomic::{AtomicUsize, Ordering},
    };

    const POST: &str = r#"<html><head><title>sakura drawn by someone - Danbooru</title></head><body>
        <section id="tag-list"><ul>
          <li class="tag-type-4"><a class="search-tag">kinomoto_sakura</a></li>
          <li class="tag-type-0"><a class="search-tag">pink hair</a></li>
          <li class="tag-type-0"><a class="search-tag">wings</a></li>
        </ul></section>
        <img id="image" src="/data/sakura.jpg">
    </body></html>"#;

    /// Serves one canned outcome and counts how often it was asked.
    struct CannedPage {
        body: Option<&'static str>,
        failure: Option<FetchFailure>,
        calls: AtomicUsize,
    }

    impl CannedPage {
        fn body(body: &'static str) -> Self {
            Self {
                body: Some(body),
                failure: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(failure: FetchFailure) -> Self {
            Self {
                body: None,
                failure: Some(failure),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageSource for CannedPage {
        fn fetch_page(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = match (&self.failure, self.body) {
                (Some(failure), _) => Err(failure.clone()),
                (None, body) => Ok(FetchedBody {
                    body: Bytes::from_static(body.unwrap_or_default().as_bytes()),
                    content_type: Some(String::from("text/html")),
                    cache_control: None,
                    final_url: url.clone(),
                }),
            };
            async move { outcome }
        }
    }

    fn extractor<S: PageSource>(source: S) -> TagExtractor<S> {
        let registry = Arc::new(SiteRegistry::with_defaults().unwrap());
        TagExtractor::new(registry, source)
    }

    #[tokio::test]
    async fn rejects_malformed_and_non_http_urls() {
        let ex = extractor(CannedPage::body(POST));

        for target in ["not a url", "ftp://danbooru.donmai.us/posts/1", "  "] {
            let err = ex.extract(&ExtractionRequest::new(target)).await.unwrap_err();
            assert!(matches!(err, ExtractorError::InvalidUrl { .. }), "{target}: {err}");
        }
        assert_eq!(ex.source().calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_site_is_not_fetched() {
        let ex = extractor(CannedPage::body(POST));

        let err = ex
            .extract(&ExtractionRequest::new("https://www.Unknown.example/post/1"))
            .await
            .unwrap_err();

        match err {
            ExtractorError::UnsupportedSite { host } => assert_eq!(host, "unknown.example"),
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(ex.source().calls(), 0);
    }

    #[tokio::test]
    async fn supported_post_merges_blacklists() {
        let ex = extractor(CannedPage::body(POST)).with_blacklist(TagBlacklist::new(["wing"]));

        let mut request = ExtractionRequest::new("https://danbooru.donmai.us/posts/42");
        request.blacklist = vec![String::from("PINK")];

        let result = ex.extract(&request).await.unwrap();

        assert_eq!(result.site_name, "Danbooru");
        assert_eq!(
            result.tags.values(TagCategory::Character).collect::<Vec<_>>(),
            vec!["kinomoto sakura"]
        );
        assert!(result.tags.get(TagCategory::General).is_empty());
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://danbooru.donmai.us/data/sakura.jpg")
        );
        assert_eq!(result.title.as_deref(), Some("sakura drawn by someone"));
        assert_eq!(ex.source().calls(), 1);
    }

    #[tokio::test]
    async fn unknown_site_uses_generic_extractor_when_allowed() {
        let ex = extractor(CannedPage::body(
            r#"<html><body><ul class="tags"><li><a>river</a></li></ul></body></html>"#,
        ));

        let mut request = ExtractionRequest::new("https://gallery.example/p/7");
        request.allow_unsupported_sites = true;

        let result = ex.extract(&request).await.unwrap();

        assert_eq!(result.site_name, "gallery.example");
        assert!(result.tags.contains(TagCategory::General, "river"));
        assert!(result
            .warnings
            .contains(&UNSUPPORTED_SITE_WARNING.to_string()));
    }

    #[tokio::test]
    async fn fetch_failures_map_to_errors() {
        let request = ExtractionRequest::new("https://danbooru.donmai.us/posts/1");

        let err = extractor(CannedPage::failing(FetchFailure::upstream(StatusCode::NOT_FOUND)))
            .extract(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::UpstreamHttp { status: 404 }));

        let err = extractor(CannedPage::failing(FetchFailure::timeout()))
            .extract(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout));

        let err = extractor(CannedPage::failing(FetchFailure::empty()))
            .extract(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::EmptyResponse));
    }

    #[tokio::test]
    async fn challenge_page_is_blocked() {
        let ex = extractor(CannedPage::body(
            "<html><head><title>Just a moment...</title></head><body></body></html>",
        ));

        let err = ex
            .extract(&ExtractionRequest::new("https://gelbooru.com/index.php?page=post&s=view&id=5"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::BlockedPage { .. }));
    }

    #[tokio::test]
    async fn generic_fallback_never_fails_on_challenge_pages() {
        let ex = extractor(CannedPage::body(
            "<html><head><title>Just a moment...</title></head><body></body></html>",
        ));

        let mut request = ExtractionRequest::new("https://gallery.example/p/8");
        request.allow_unsupported_sites = true;

        let result = ex.extract(&request).await.unwrap();

        assert!(result.tags.is_empty());
        assert_eq!(result.warnings[0], UNSUPPORTED_SITE_WARNING);
        assert!(result.warnings.iter().any(|w| w.starts_with("Page may be blocked")));
    }

    fn local_registry() -> Arc<SiteRegistry> {
        let mut selectors = BTreeMap::new();
        selectors.insert(TagCategory::General, String::from("ul.tags a"));

        let spec = ProfileSpec {
            name: String::from("Local"),
            domain: String::from("127.0.0.1"),
            hosts: Vec::new(),
            path_pattern: Some(String::from(r"^/posts/\d+")),
            rank: 1,
            probe_url: None,
            mirror_host: None,
            tags: TagRuleSpec::PerCategory { selectors },
            image: Vec::new(),
            title: Vec::new(),
            ignore: Vec::new(),
        };

        Arc::new(SiteRegistry::new(&[spec]).unwrap())
    }

    #[tokio::test]
    async fn end_to_end_over_http() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/posts/5");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<html><body><ul class="tags"><a>lake</a><a>sky</a></ul></body></html>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts/6");
                then.status(500);
            })
            .await;

        let ex = TagExtractor::new(local_registry(), FetchGateway::new().unwrap());

        let result = ex
            .extract(&ExtractionRequest::new(&server.url("/posts/5")))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.site_name, "Local");
        assert_eq!(result.tag_count(), 2);

        let err = ex
            .extract(&ExtractionRequest::new(&server.url("/posts/6")))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::UpstreamHttp { status: 500 }));
    }
}
