//! Error types for the query pipeline and the federation protocol.
//!
//! The two protocols carry distinct failure taxonomies: a 404 from the
//! generic pipeline is a [`Error::Remote`] like any other non-2xx status,
//! while a 404 from a resolution server specifically means the address does
//! not exist ([`FederationError::NotFound`]). Keeping the enums separate
//! keeps those meanings from blurring at the call site.

use http::StatusCode;

/// The main error type for query-pipeline calls.
///
/// # Examples
///
/// ```no_run
/// use ledger_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://ledger.example.com")?
///     .build()?;
///
/// match client.ledgers().execute().await {
///     Ok(page) => println!("{} records", page.data.records().len()),
///     Err(Error::RateLimited { retry_after }) => {
///         eprintln!("rate limited, advised wait: {:?}s", retry_after);
///     }
///     Err(Error::Remote { status, body }) => {
///         eprintln!("remote error {}: {}", status, body);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A transport-level error occurred (connection failed, DNS lookup
    /// failed, body read interrupted, etc.).
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The service answered 429. The advised wait comes from the
    /// `Retry-After` header when present.
    ///
    /// This is the only locally-interpreted error status; acting on the
    /// advised delay is the caller's decision, never this crate's.
    #[error("rate limited by the service (retry after {retry_after:?}s)")]
    RateLimited {
        /// Advised wait in seconds, parsed from `Retry-After`.
        retry_after: Option<u64>,
    },

    /// The service answered with a non-2xx status other than 429.
    #[error("remote error {status}: {body}")]
    Remote {
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body, kept for debugging.
        body: String,
    },

    /// A 2xx response arrived with no body where one was required.
    #[error("response contains no content")]
    EmptyBody,

    /// The response body did not deserialize into the expected shape.
    #[error("failed to decode response (status {status}): {message}")]
    Decode {
        /// The HTTP status code of the response.
        status: StatusCode,
        /// The serde error message.
        message: String,
        /// The raw body that failed to decode.
        raw_body: String,
    },

    /// An invalid URL was provided or derived.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The path segments of a query were replaced a second time.
    ///
    /// Replacing segments is a one-shot operation; a second attempt is a
    /// caller-side contract violation, not a condition to recover from.
    #[error("URL path segments have already been replaced")]
    IllegalReuse,

    /// Invalid client configuration (missing base URL, bad value, etc.).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if a caller could reasonably retry the call.
    ///
    /// Rate limits, transport failures, and 5xx statuses qualify. Contract
    /// violations and decode failures never do. The crate itself never
    /// retries; this is advisory for the caller's own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::RateLimited { .. } => true,
            Error::Remote { status, .. } => status.is_server_error(),
            Error::EmptyBody
            | Error::Decode { .. }
            | Error::InvalidUrl(_)
            | Error::IllegalReuse
            | Error::Configuration(_) => false,
        }
    }

    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Decode { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }

    /// Returns the advised rate-limit wait in seconds, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Errors raised by the federation discovery and resolution phases.
///
/// Both phases are terminal: any variant ends the call that raised it.
#[derive(thiserror::Error, Debug)]
pub enum FederationError {
    /// A transport-level failure while talking to the domain host or the
    /// resolution server.
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The address is not of the exact form `local*domain` with two
    /// non-empty parts. Raised before any network call.
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),

    /// The well-known config document could not be fetched, or its body was
    /// empty or unparseable.
    #[error("well-known config document not found")]
    ConfigNotFound,

    /// The config document does not name a resolution server.
    #[error("config document contains no resolution server")]
    NoResolutionServer,

    /// The resolution server URI is malformed or not `https`.
    #[error("invalid resolution server: {0}")]
    InvalidServer(String),

    /// The resolution server does not know the address.
    #[error("address not found by resolution server")]
    NotFound,

    /// The resolution server answered with a non-2xx status other than 404.
    #[error("resolution server error {status}")]
    ServerError {
        /// The HTTP status code.
        status: StatusCode,
    },

    /// The resolution response body was empty or failed to decode.
    #[error("failed to decode resolution response: {0}")]
    Decode(#[source] Error),
}

/// A specialized `Result` for query-pipeline calls.
pub type Result<T> = std::result::Result<T, Error>;
