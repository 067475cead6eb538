//! Resilient HTTP request utilities using retry and timeout middleware.
//!
//! Requests run through [`seatbelt`] retry and timeout layers so that transient
//! network failures, server errors and rate limiting are retried with exponential
//! backoff; everything else is handed back to the caller unchanged.

use core::time::Duration;
use humantime_serde::re::humantime::format_duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

/// Default timeout for a single HTTP attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum retry attempts (on top of the first request).
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between retries.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay in seconds used for 429 responses that carry no `Retry-After`.
const RATE_LIMIT_DELAY_SECS: u64 = 5;

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    let s = headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok()
}

/// Classify an HTTP response for retry purposes.
fn should_retry_response(result: &crate::Result<reqwest::Response>) -> RecoveryInfo {
    match result {
        // Network, connection and timeout errors are always transient.
        Err(_) => RecoveryInfo::retry(),

        Ok(resp) if resp.status().is_server_error() => RecoveryInfo::retry(),

        // Rate-limited (429): honor Retry-After if present.
        Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
            let delay = parse_retry_after(resp.headers()).unwrap_or(RATE_LIMIT_DELAY_SECS);
            RecoveryInfo::retry().delay(Duration::from_secs(delay))
        }

        // 403 with Retry-After is a throttle, not a permission failure.
        Ok(resp) if resp.status() == reqwest::StatusCode::FORBIDDEN => {
            parse_retry_after(resp.headers()).map_or_else(RecoveryInfo::never, |delay| {
                RecoveryInfo::retry().delay(Duration::from_secs(delay))
            })
        }

        // Success and other client errors are final.
        _ => RecoveryInfo::never(),
    }
}

/// Send an HTTP request with automatic retry and a per-attempt timeout.
///
/// `make_request` builds a fresh request from `client` on every attempt, since
/// request bodies such as multipart forms cannot be replayed. `name` identifies the
/// operation in logs and errors. The last response is returned even when its status
/// is an error, so callers decide how to report it.
pub async fn resilient_send<F>(
    client: &reqwest::Client,
    name: &'static str,
    timeout: Duration,
    make_request: F,
) -> crate::Result<reqwest::Response>
where
    F: Fn(&reqwest::Client) -> reqwest::RequestBuilder + Send + Sync + 'static,
{
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name(name);

    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<reqwest::Response>, _| should_retry_response(result))
            .max_retry_attempts(MAX_RETRY_ATTEMPTS)
            .base_delay(RETRY_BASE_DELAY)
            .backoff(Backoff::Exponential)
            .on_retry(move |_output, args| {
                log::debug!(
                    "retrying {name} (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |_| app_err!("{name} timed out after {}", format_duration(timeout)))
            .timeout(timeout),
        Execute::new(move |client: reqwest::Client| {
            let request = make_request(&client);
            async move { request.send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(client.clone()).await
}

/// Send an HTTP GET request with automatic retry and timeout.
pub async fn resilient_get(client: &reqwest::Client, url: &str, timeout: Duration) -> crate::Result<reqwest::Response> {
    let url = url.to_string();
    resilient_send(client, "HTTP GET", timeout, move |client| client.get(&url)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/missing", server.uri()), DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<AF />"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/flaky", server.uri()), DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_honors_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/limited", server.uri()), DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_forbidden_without_retry_after_is_final() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &server.uri(), DEFAULT_REQUEST_TIMEOUT).await.unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_retries_stop_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/throttled"))
            .respond_with(ResponseTemplate::new(403).insert_header("Retry-After", "0"))
            .expect(u64::from(MAX_RETRY_ATTEMPTS) + 1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/throttled", server.uri()), DEFAULT_REQUEST_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }
}
