//! HTTP retry helpers for transient errors.
//!
//! Every request made by [`crate::DashboardClient`] goes through
//! [`send_text`], which retries connection failures, timeouts, HTTP 429
//! and HTTP 5xx with exponential backoff. HTTP 4xx (other than 429) is
//! permanent and returned immediately.
//!
//! Bodies are returned as text so callers can deserialize directly from
//! the source bytes, which keeps JSON object key order intact.

use crate::ClientError;
use crate::config::RetryPolicy;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// # Errors
///
/// Returns [`ClientError`] if the request fails after all retries, the
/// server answers with a non-retryable status, or the body cannot be
/// read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F, policy: RetryPolicy) -> Result<String, ClientError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, policy).await?;
    let url = response.url().to_string();

    response.text().await.map_err(|e| {
        log::error!("Response body read failed for {url}: {e}");
        ClientError::Http(e)
    })
}

/// Core retry loop.
///
/// Returns the first response with a success or redirect status.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    policy: RetryPolicy,
) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut last_error: Option<ClientError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(ClientError::Http(e));
                    continue;
                }
                return Err(ClientError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let url = response.url().to_string();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {url}");
                        last_error = Some(ClientError::Status {
                            status: status.as_u16(),
                            url,
                        });
                        continue;
                    }
                    log::error!("HTTP {status} from {url} after {max_retries} retries");
                    return Err(ClientError::Status {
                        status: status.as_u16(),
                        url,
                    });
                }

                if status.is_client_error() {
                    let body = response.text().await.unwrap_or_default();
                    log::error!("HTTP {status} from {url}: {}", preview(&body));
                    // The dashboard API reports 4xx with an error envelope;
                    // surface its message when there is one.
                    if let Some(message) = envelope_error_message(&body) {
                        return Err(ClientError::Protocol { message });
                    }
                    return Err(ClientError::Status {
                        status: status.as_u16(),
                        url,
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ClientError::Protocol {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

/// Extracts `error` from a `{ "success": false, "error": "..." }` body.
fn envelope_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if value.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
        value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
    } else {
        None
    }
}

fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
