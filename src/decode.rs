//! Uniform response classification and decoding.
//!
//! Every response from the service passes through [`decode`], which applies
//! one status ladder for the whole crate: 429 becomes
//! [`Error::RateLimited`], any other non-2xx becomes [`Error::Remote`], a
//! 2xx with an empty body becomes [`Error::EmptyBody`], and anything else is
//! deserialized into the shape the caller asked for. Decoding is
//! schema-driven: the expected type is always supplied up front, never
//! sniffed from the content.

use crate::{Error, Result};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::SystemTime;

/// Advisory rate-limit metadata copied from response headers.
///
/// Never blocks a call; surfaced so the caller can pace itself. A field is
/// `None` exactly when its header was absent or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Value of `X-Ratelimit-Limit`.
    pub limit: Option<u64>,
    /// Value of `X-Ratelimit-Remaining`.
    pub remaining: Option<u64>,
    /// Value of `X-Ratelimit-Reset`, in seconds.
    pub reset_secs: Option<u64>,
}

impl RateLimitSnapshot {
    /// Extracts the snapshot from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u64(headers, "x-ratelimit-limit"),
            remaining: header_u64(headers, "x-ratelimit-remaining"),
            reset_secs: header_u64(headers, "x-ratelimit-reset"),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

/// Parses `Retry-After` as integer seconds, falling back to the HTTP-date
/// form.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(seconds);
    }

    if let Ok(at) = httpdate::parse_http_date(header) {
        if let Ok(until) = at.duration_since(SystemTime::now()) {
            return Some(until.as_secs());
        }
    }

    None
}

/// A decoded response: the typed value plus its response metadata.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    /// The deserialized value.
    pub data: T,

    /// The HTTP status of the response.
    pub status: http::StatusCode,

    /// Rate-limit headers observed on this response.
    pub rate_limit: RateLimitSnapshot,
}

impl<T> Decoded<T> {
    /// Maps the decoded value while keeping the response metadata.
    pub fn map<U, F>(self, f: F) -> Decoded<U>
    where
        F: FnOnce(T) -> U,
    {
        Decoded {
            data: f(self.data),
            status: self.status,
            rate_limit: self.rate_limit,
        }
    }
}

impl<T> AsRef<T> for Decoded<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Decoded<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Classifies a raw response and decodes its body into `T`.
///
/// Exactly one of four outcomes:
/// - 429 → [`Error::RateLimited`] with the advised wait from `Retry-After`;
/// - any other non-2xx → [`Error::Remote`];
/// - 2xx with an empty body → [`Error::EmptyBody`];
/// - 2xx with a body → `T`, with the `X-Ratelimit-*` headers copied into
///   the returned [`Decoded`].
pub async fn decode<T>(response: reqwest::Response) -> Result<Decoded<T>>
where
    T: DeserializeOwned,
{
    let status = response.status();

    if status == http::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(response.headers());
        tracing::warn!(retry_after = ?retry_after, "rate limited by service");
        return Err(Error::RateLimited { retry_after });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "remote error");
        return Err(Error::Remote { status, body });
    }

    let headers = response.headers().clone();
    let body = response.text().await?;
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }

    match serde_json::from_str::<T>(&body) {
        Ok(data) => Ok(Decoded {
            data,
            status,
            rate_limit: RateLimitSnapshot::from_headers(&headers),
        }),
        Err(e) => {
            tracing::error!(error = %e, raw_body = %body, "failed to decode response");
            Err(Error::Decode {
                status,
                message: e.to_string(),
                raw_body: body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn snapshot_copies_all_three_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("3600"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("120"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("17"));

        let snapshot = RateLimitSnapshot::from_headers(&headers);
        assert_eq!(snapshot.limit, Some(3600));
        assert_eq!(snapshot.remaining, Some(120));
        assert_eq!(snapshot.reset_secs, Some(17));
    }

    #[test]
    fn absent_headers_stay_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("5"));

        let snapshot = RateLimitSnapshot::from_headers(&headers);
        assert_eq!(snapshot.limit, None);
        assert_eq!(snapshot.remaining, Some(5));
        assert_eq!(snapshot.reset_secs, None);
    }

    #[test]
    fn unparseable_header_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("soon"));

        let snapshot = RateLimitSnapshot::from_headers(&headers);
        assert_eq!(snapshot.limit, None);
    }

    #[test]
    fn retry_after_integer_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("5"));
        assert_eq!(parse_retry_after(&headers), Some(5));
    }

    #[test]
    fn retry_after_http_date() {
        let at = SystemTime::now() + std::time::Duration::from_secs(90);
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(at)).unwrap(),
        );
        let secs = parse_retry_after(&headers).unwrap();
        assert!((88..=90).contains(&secs), "got {}", secs);
    }

    #[test]
    fn retry_after_missing() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn decoded_map_keeps_metadata() {
        let decoded = Decoded {
            data: 42u32,
            status: http::StatusCode::OK,
            rate_limit: RateLimitSnapshot {
                limit: Some(1),
                remaining: None,
                reset_secs: None,
            },
        };
        let mapped = decoded.map(|n| n.to_string());
        assert_eq!(mapped.data, "42");
        assert_eq!(mapped.rate_limit.limit, Some(1));
    }
}
