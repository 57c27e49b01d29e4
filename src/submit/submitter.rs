// src/submit/submitter.rs
// =============================================================================
// The submission orchestrator.
//
// What happens on submit():
// 1. Submissions disabled in config?  -> informational result, no request
// 2. Spam guard in cool-down?         -> informational result, no request
// 3. More than 10,000 URLs queued?    -> ExcessUrls
// 4. Make every URL absolute          -> NonAbsoluteUrl on failure
// 5. One URL: GET with query params; several: POST a JSON batch; none: info
// 6. Hand the response to the spam guard (may arm a future block)
// 7. Log the outcome and return it
//
// Errors are written to the activity log at the point they are raised.
// =============================================================================

use super::transport::{BatchPayload, Transport, TransportResponse, TransportError};
use super::urls::{host_of, UrlInput, UrlSet};
use crate::activity::ActivityLog;
use crate::engine;
use crate::error::{IndexNowError, Result};
use crate::guard::SpamGuard;
use crate::key::ApiKey;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use url::Url;

pub const DISABLED_MESSAGE: &str = "Enable Submissions is set to false. Set INDEXNOW_ENABLE_SUBMISSIONS=true to send requests to IndexNow.";
pub const BLOCKED_MESSAGE: &str =
    "The use of IndexNow has been temporarily blocked to prevent potential spam.";
pub const NO_URLS_MESSAGE: &str = "No URLs provided for indexing.";

/// Settings the submitter reads from configuration.
#[derive(Debug, Clone)]
pub struct SubmitterOptions {
    /// `enable_submissions`
    pub enable_submissions: bool,
    /// Application base URL, for relative URLs and host fallback
    pub base_url: Option<String>,
}

impl Default for SubmitterOptions {
    fn default() -> Self {
        Self {
            enable_submissions: true,
            base_url: None,
        }
    }
}

/// What the search engine said about a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    /// Endpoint host the request went to
    #[serde(rename = "searchEngine")]
    pub search_engine: String,
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub info: String,
    /// URLs that were submitted, deduplicated
    pub urls: Vec<String>,
}

impl SubmissionReport {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of `submit`: a report, or a message explaining why nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmissionOutcome {
    Submitted(SubmissionReport),
    Skipped(String),
}

pub struct UrlSubmitter {
    engine_host: &'static str,
    key: ApiKey,
    key_location: Option<String>,
    urls: UrlSet,
    options: SubmitterOptions,
    guard: Arc<SpamGuard>,
    transport: Arc<dyn Transport>,
    log: ActivityLog,
}

impl UrlSubmitter {
    pub fn new(
        search_engine: &str,
        key: ApiKey,
        options: SubmitterOptions,
        guard: Arc<SpamGuard>,
        transport: Arc<dyn Transport>,
        log: ActivityLog,
    ) -> Result<Self> {
        let engine_host = resolve_engine(search_engine, &log)?;

        Ok(Self {
            engine_host,
            key,
            key_location: None,
            urls: UrlSet::new(),
            options,
            guard,
            transport,
            log,
        })
    }

    pub fn set_search_engine(&mut self, search_engine: &str) -> Result<()> {
        self.engine_host = resolve_engine(search_engine, &self.log)?;
        Ok(())
    }

    /// Host of the selected search engine.
    pub fn search_engine(&self) -> &str {
        self.engine_host
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }

    pub fn key_location(&self) -> Option<&str> {
        self.key_location.as_deref()
    }

    pub fn add_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.urls.push(url);
        self
    }

    pub fn add_urls(&mut self, urls: impl Into<UrlInput>) -> &mut Self {
        self.urls.extend(urls);
        self
    }

    /// Queued URLs, deduplicated in first-seen order.
    pub fn get_urls(&self) -> Vec<String> {
        self.urls.unique()
    }

    /// Adopts the key hosted at `url` and sends `keyLocation` with submissions.
    pub async fn use_key_location(&mut self, url: &str) -> Result<()> {
        let body = self
            .transport
            .fetch_text(url)
            .await
            .map_err(|e| self.log.record_error(IndexNowError::from(e)))?;

        let key = ApiKey::try_from(body).map_err(|e| self.log.record_error(e))?;

        self.key = key;
        self.key_location = Some(url.to_string());
        Ok(())
    }

    /// Submits the queued URLs plus `urls`, if given.
    pub async fn submit(&mut self, urls: Option<UrlInput>) -> Result<SubmissionOutcome> {
        if let Some(urls) = urls {
            self.urls.extend(urls);
        }

        let outcome = self.process().await?;
        self.log.record(&outcome);
        Ok(outcome)
    }

    async fn process(&mut self) -> Result<SubmissionOutcome> {
        if !self.options.enable_submissions {
            return Ok(SubmissionOutcome::Skipped(DISABLED_MESSAGE.to_string()));
        }

        if !self.guard.is_allowed() {
            return Ok(SubmissionOutcome::Skipped(BLOCKED_MESSAGE.to_string()));
        }

        self.urls
            .check_limit()
            .map_err(|e| self.log.record_error(e))?;
        self.urls
            .normalize(self.options.base_url.as_deref())
            .map_err(|e| self.log.record_error(e))?;

        let urls = self.urls.unique();
        let endpoint = self.endpoint()?;

        let response = match urls.as_slice() {
            [] => return Ok(SubmissionOutcome::Skipped(NO_URLS_MESSAGE.to_string())),
            [url] => self.send_single(endpoint, url).await,
            _ => self.send_batch(endpoint, &urls).await,
        }
        .map_err(|e| self.log.record_error(IndexNowError::from(e)))?;

        self.guard
            .inspect(&response, urls.first().map(String::as_str));

        info!(
            search_engine = self.engine_host,
            status = response.status,
            count = urls.len(),
            "IndexNow submission completed"
        );

        Ok(SubmissionOutcome::Submitted(SubmissionReport {
            search_engine: self.engine_host.to_string(),
            status: response.status,
            info: response.reason,
            urls,
        }))
    }

    fn endpoint(&self) -> Result<Url> {
        Url::parse(&format!("https://{}/indexnow", self.engine_host)).map_err(|e| {
            self.log.record_error(IndexNowError::Mixed {
                message: e.to_string(),
                code: None,
            })
        })
    }

    /// Host of the first URL, else of the base URL, else empty.
    fn batch_host(&self, urls: &[String]) -> String {
        urls.first()
            .and_then(|url| host_of(url))
            .or_else(|| self.options.base_url.as_deref().and_then(host_of))
            .unwrap_or_default()
    }

    async fn send_single(
        &self,
        mut endpoint: Url,
        url: &str,
    ) -> std::result::Result<TransportResponse, TransportError> {
        {
            let mut query = endpoint.query_pairs_mut();
            query.append_pair("url", url);
            query.append_pair("key", self.key.as_str());
            if let Some(location) = &self.key_location {
                query.append_pair("keyLocation", location);
            }
        }

        self.transport.get(&endpoint).await
    }

    async fn send_batch(
        &self,
        endpoint: Url,
        urls: &[String],
    ) -> std::result::Result<TransportResponse, TransportError> {
        let payload = BatchPayload {
            host: self.batch_host(urls),
            key: self.key.as_str().to_string(),
            key_location: self.key_location.clone(),
            url_list: urls.to_vec(),
        };

        self.transport.post_json(&endpoint, &payload).await
    }
}

fn resolve_engine(search_engine: &str, log: &ActivityLog) -> Result<&'static str> {
    engine::resolve(search_engine).ok_or_else(|| {
        log.record_error(IndexNowError::SearchEngineUnknown(
            search_engine.to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemorySlot;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get(Url),
        Post(Url, BatchPayload),
        Fetch(String),
    }

    /// Records every request and answers with a fixed status.
    struct RecordingTransport {
        calls: Mutex<Vec<Call>>,
        status: u16,
        fail: bool,
        hosted_key: String,
    }

    impl RecordingTransport {
        fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                status,
                fail: false,
                hosted_key: "hostedKey98765".to_string(),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                status: 0,
                fail: true,
                hosted_key: String::new(),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self) -> std::result::Result<TransportResponse, TransportError> {
            if self.fail {
                return Err(TransportError {
                    message: "Connection failed: connection refused".to_string(),
                    code: None,
                });
            }
            Ok(TransportResponse {
                status: self.status,
                reason: "Accepted".to_string(),
                retry_after: Some("60".to_string()),
            })
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn get(&self, url: &Url) -> std::result::Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(Call::Get(url.clone()));
            self.respond()
        }

        async fn post_json(
            &self,
            url: &Url,
            payload: &BatchPayload,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Post(url.clone(), payload.clone()));
            self.respond()
        }

        async fn fetch_text(&self, url: &str) -> std::result::Result<String, TransportError> {
            self.calls.lock().unwrap().push(Call::Fetch(url.to_string()));
            if self.fail {
                return Err(TransportError {
                    message: "unreachable".to_string(),
                    code: None,
                });
            }
            Ok(self.hosted_key.clone())
        }
    }

    fn key() -> ApiKey {
        "validApiKey12345".parse().unwrap()
    }

    fn guard() -> Arc<SpamGuard> {
        Arc::new(SpamGuard::new(Box::new(MemorySlot::new()), ActivityLog::disabled()))
    }

    fn options() -> SubmitterOptions {
        SubmitterOptions {
            enable_submissions: true,
            base_url: Some("https://example.com".to_string()),
        }
    }

    fn submitter(transport: &Arc<RecordingTransport>, guard: &Arc<SpamGuard>) -> UrlSubmitter {
        UrlSubmitter::new(
            "microsoft_bing",
            key(),
            options(),
            guard.clone(),
            transport.clone(),
            ActivityLog::disabled(),
        )
        .unwrap()
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_set_search_engine() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());

        assert_eq!(submitter.search_engine(), "www.bing.com");
        submitter.set_search_engine("Yandex").unwrap();
        assert_eq!(submitter.search_engine(), "yandex.com");

        let err = submitter.set_search_engine("invalid_engine").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SearchEngineUnknown);
        assert_eq!(submitter.search_engine(), "yandex.com");
    }

    #[test]
    fn test_unknown_engine_fails_construction_and_is_logged() {
        let dir = TempDir::new().unwrap();
        let log = ActivityLog::new(dir.path().join("indexnow.log"), true);

        let result = UrlSubmitter::new(
            "altavista",
            key(),
            options(),
            guard(),
            RecordingTransport::answering(200),
            log.clone(),
        );

        assert_eq!(result.err().unwrap().kind(), ErrorKind::SearchEngineUnknown);
        assert!(log.show().unwrap().contains("altavista"));
    }

    #[test]
    fn test_get_urls_deduplicates_in_order() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());

        submitter
            .add_url("https://example.com/a")
            .add_urls(vec!["https://example.com/b", "https://example.com/a"])
            .add_url("https://example.com/c");

        assert_eq!(
            submitter.get_urls(),
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
    }

    #[tokio::test]
    async fn test_single_url_is_one_get_with_query() {
        let transport = RecordingTransport::answering(202);
        let mut submitter = submitter(&transport, &guard());

        let outcome = submitter
            .submit(Some("https://example.com/page".into()))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let Call::Get(url) = &calls[0] else {
            panic!("expected a GET, got {:?}", calls[0]);
        };
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("www.bing.com"));
        assert_eq!(url.path(), "/indexnow");
        assert_eq!(
            query_pairs(url),
            vec![
                ("url".to_string(), "https://example.com/page".to_string()),
                ("key".to_string(), "validApiKey12345".to_string()),
            ]
        );

        assert_eq!(
            outcome,
            SubmissionOutcome::Submitted(SubmissionReport {
                search_engine: "www.bing.com".to_string(),
                status: 202,
                info: "Accepted".to_string(),
                urls: vec!["https://example.com/page".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn test_multiple_urls_are_one_post() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());
        let urls = vec![
            "https://customdomain.com/page1",
            "https://customdomain.com/page2",
            "https://customdomain.com/page1",
            "https://customdomain.com/page3",
        ];

        let outcome = submitter.submit(Some(urls.into())).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let Call::Post(url, payload) = &calls[0] else {
            panic!("expected a POST, got {:?}", calls[0]);
        };
        assert_eq!(url.as_str(), "https://www.bing.com/indexnow");
        assert_eq!(payload.host, "customdomain.com");
        assert_eq!(payload.key, "validApiKey12345");
        assert_eq!(payload.key_location, None);
        assert_eq!(payload.url_list.len(), 3);

        let SubmissionOutcome::Submitted(report) = outcome else {
            panic!("expected a submission report");
        };
        assert_eq!(report.urls, payload.url_list);
    }

    #[tokio::test]
    async fn test_relative_urls_use_base_url() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());

        let outcome = submitter
            .submit(Some(vec!["/relative-page", "/other"].into()))
            .await
            .unwrap();

        let SubmissionOutcome::Submitted(report) = outcome else {
            panic!("expected a submission report");
        };
        assert_eq!(
            report.urls,
            vec!["https://example.com/relative-page", "https://example.com/other"]
        );
        let Call::Post(_, payload) = &transport.calls()[0] else {
            panic!("expected a POST");
        };
        assert_eq!(payload.host, "example.com");
    }

    #[tokio::test]
    async fn test_unresolvable_url_aborts_without_request() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = UrlSubmitter::new(
            "microsoft_bing",
            key(),
            SubmitterOptions {
                enable_submissions: true,
                base_url: None,
            },
            guard(),
            transport.clone(),
            ActivityLog::disabled(),
        )
        .unwrap();

        let err = submitter
            .submit(Some(
                vec!["https://example.com/ok", "invalid-url-with-no-host"].into(),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NonAbsoluteUrl);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_more_than_limit_is_rejected_even_if_duplicates() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());

        let urls: Vec<String> = (0..=10_000)
            .map(|i| {
                if i % 2 == 0 {
                    "https://example.com/same".to_string()
                } else {
                    "no host at all".to_string()
                }
            })
            .collect();

        let err = submitter.submit(Some(urls.into())).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExcessUrls);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_submissions_make_no_request() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = UrlSubmitter::new(
            "microsoft_bing",
            key(),
            SubmitterOptions {
                enable_submissions: false,
                base_url: None,
            },
            guard(),
            transport.clone(),
            ActivityLog::disabled(),
        )
        .unwrap();

        let outcome = submitter
            .submit(Some("https://example.com/page".into()))
            .await
            .unwrap();

        assert_eq!(outcome, SubmissionOutcome::Skipped(DISABLED_MESSAGE.to_string()));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_urls_is_informational() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());

        let outcome = submitter.submit(None).await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::Skipped(NO_URLS_MESSAGE.to_string()));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_response_blocks_next_submission() {
        let transport = RecordingTransport::answering(429);
        let guard = guard();
        let mut first = submitter(&transport, &guard);

        let outcome = first
            .submit(Some("https://example.com/page".into()))
            .await
            .unwrap();

        // The current result still reports what the engine said
        let SubmissionOutcome::Submitted(report) = outcome else {
            panic!("expected a submission report");
        };
        assert_eq!(report.status, 429);
        assert!(!guard.is_allowed());

        let mut second = submitter(&transport, &guard);
        let outcome = second
            .submit(Some("https://example.com/other".into()))
            .await
            .unwrap();

        assert_eq!(outcome, SubmissionOutcome::Skipped(BLOCKED_MESSAGE.to_string()));
        assert_eq!(transport.calls().len(), 1);

        assert!(guard.reset_blocking());
        let mut third = submitter(&transport, &guard);
        third
            .submit(Some("https://example.com/again".into()))
            .await
            .unwrap();
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_mixed_and_logged() {
        let dir = TempDir::new().unwrap();
        let log = ActivityLog::new(dir.path().join("indexnow.log"), true);
        let transport = RecordingTransport::failing();
        let mut submitter = UrlSubmitter::new(
            "naver",
            key(),
            options(),
            guard(),
            transport.clone(),
            log.clone(),
        )
        .unwrap();

        let err = submitter
            .submit(Some("https://example.com/page".into()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mixed);
        assert_eq!(transport.calls().len(), 1);
        assert!(log.show().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_successful_submission_is_logged() {
        let dir = TempDir::new().unwrap();
        let log = ActivityLog::new(dir.path().join("indexnow.log"), true);
        let mut submitter = UrlSubmitter::new(
            "seznam",
            key(),
            options(),
            guard(),
            RecordingTransport::answering(200),
            log.clone(),
        )
        .unwrap();

        submitter
            .submit(Some("https://example.com/page".into()))
            .await
            .unwrap();

        let trail = log.show().unwrap();
        assert!(trail.contains(r#""searchEngine":"search.seznam.cz""#));
        assert!(trail.contains(r#""status":200"#));
    }

    #[test]
    fn test_outcome_json_shape() {
        let submitted = SubmissionOutcome::Submitted(SubmissionReport {
            search_engine: "www.bing.com".to_string(),
            status: 202,
            info: "Accepted".to_string(),
            urls: vec!["https://example.com/page".to_string()],
        });
        assert_eq!(
            serde_json::to_value(&submitted).unwrap(),
            serde_json::json!({
                "searchEngine": "www.bing.com",
                "status": 202,
                "info": "Accepted",
                "urls": ["https://example.com/page"],
            })
        );

        let skipped = SubmissionOutcome::Skipped(NO_URLS_MESSAGE.to_string());
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            serde_json::json!(NO_URLS_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_key_location_is_fetched_and_sent() {
        let transport = RecordingTransport::answering(200);
        let mut submitter = submitter(&transport, &guard());
        let location = "https://example.com/hostedKey98765.txt";

        submitter.use_key_location(location).await.unwrap();
        assert_eq!(submitter.key().as_str(), "hostedKey98765");
        assert_eq!(submitter.key_location(), Some(location));

        submitter
            .submit(Some(vec!["https://example.com/a", "https://example.com/b"].into()))
            .await
            .unwrap();
        submitter.urls = UrlSet::new();
        submitter
            .submit(Some("https://example.com/c".into()))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0], Call::Fetch(location.to_string()));
        let Call::Post(_, payload) = &calls[1] else {
            panic!("expected a POST");
        };
        assert_eq!(payload.key, "hostedKey98765");
        assert_eq!(payload.key_location.as_deref(), Some(location));
        let Call::Get(url) = &calls[2] else {
            panic!("expected a GET");
        };
        assert!(query_pairs(url).contains(&("keyLocation".to_string(), location.to_string())));
    }

    #[tokio::test]
    async fn test_unreachable_key_location_keeps_old_key() {
        let transport = RecordingTransport::failing();
        let mut submitter = submitter(&transport, &guard());

        let err = submitter
            .use_key_location("https://example.com/missing.txt")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mixed);
        assert_eq!(submitter.key().as_str(), "validApiKey12345");
        assert_eq!(submitter.key_location(), None);
    }
}
