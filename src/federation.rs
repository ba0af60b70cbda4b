//! Federated address resolution.
//!
//! Maps a human-readable address of the form `local*domain` to an account
//! identifier in two hops. *Discovery* fetches
//! `https://{domain}/.well-known/ledger.toml` and reads the
//! `RESOLUTION_SERVER` field out of it, yielding a [`FederationRecord`].
//! *Resolution* asks that server `?type=name&q={address}` for the account.
//!
//! The phases are split so a caller can hold on to the [`FederationRecord`]
//! for a domain and skip the config fetch on repeated lookups; the resolver
//! itself caches nothing.
//!
//! # Examples
//!
//! ```no_run
//! use ledger_client::FederationResolver;
//!
//! # async fn example() -> Result<(), ledger_client::FederationError> {
//! let resolver = FederationResolver::new();
//! let resolved = resolver.resolve("bob*example.com").await?;
//! println!("account: {}", resolved.account_id);
//! # Ok(())
//! # }
//! ```

use crate::decode::decode;
use crate::{Error, FederationError};
use serde::Deserialize;
use url::Url;

/// Name of the well-known config document hosted by the domain.
const WELL_KNOWN_CONFIG: &str = "ledger.toml";

/// Config field naming the resolution server for a domain.
const RESOLUTION_SERVER_FIELD: &str = "RESOLUTION_SERVER";

/// A discovered (or directly supplied) resolution endpoint for one domain.
///
/// Construction enforces the secure-transport invariant: the server URI
/// must be `https`, with no exceptions.
#[derive(Debug, Clone)]
pub struct FederationRecord {
    server: Url,
    domain: String,
}

impl FederationRecord {
    /// Creates a record, validating the server URI.
    ///
    /// Fails with [`FederationError::InvalidServer`] if the URI does not
    /// parse or does not use `https`.
    pub fn new(
        server: impl AsRef<str>,
        domain: impl Into<String>,
    ) -> Result<Self, FederationError> {
        let raw = server.as_ref();
        let server: Url = raw
            .parse()
            .map_err(|_| FederationError::InvalidServer(raw.to_owned()))?;

        if server.scheme() != "https" {
            return Err(FederationError::InvalidServer(raw.to_owned()));
        }

        Ok(Self {
            server,
            domain: domain.into(),
        })
    }

    /// Builds a record without the secure-transport check. Test support for
    /// pointing resolution at a local mock server; not part of the public
    /// contract.
    #[doc(hidden)]
    pub fn new_unchecked(server: Url, domain: impl Into<String>) -> Self {
        Self {
            server,
            domain: domain.into(),
        }
    }

    /// The resolution server URI.
    pub fn server(&self) -> &Url {
        &self.server
    }

    /// The domain this record answers for.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// The protocol-defined result of resolving an address.
///
/// A typed passthrough: fields are carried to the caller, not interpreted
/// here.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedAddress {
    /// The account identifier the address maps to.
    pub account_id: String,
    /// Memo kind the sender should attach, if any.
    pub memo_type: Option<String>,
    /// Memo value the sender should attach, if any.
    pub memo: Option<String>,
    /// Any further fields the server included.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Implements the two-hop discovery protocol.
///
/// Stateless apart from the injected transport; both phases are terminal
/// per call.
#[derive(Debug, Clone, Default)]
pub struct FederationResolver {
    http: reqwest::Client,
    well_known_base: Option<String>,
}

impl FederationResolver {
    /// Creates a resolver with a default transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver using the supplied transport.
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            http,
            well_known_base: None,
        }
    }

    /// Replaces the `https://{domain}` origin of the well-known fetch. Test
    /// support for serving the config from a local mock server; not part of
    /// the public contract.
    #[doc(hidden)]
    pub fn with_well_known_base(mut self, base: impl Into<String>) -> Self {
        self.well_known_base = Some(base.into());
        self
    }

    /// Discovery: finds the resolution server advertised by `domain`.
    ///
    /// Issues exactly one GET, to
    /// `https://{domain}/.well-known/ledger.toml`.
    pub async fn discover(&self, domain: &str) -> Result<FederationRecord, FederationError> {
        let well_known = match &self.well_known_base {
            Some(base) => format!("{base}/.well-known/{WELL_KNOWN_CONFIG}"),
            None => well_known_url(domain),
        };
        tracing::debug!(url = %well_known, "fetching well-known config");

        let response = self.http.get(&well_known).send().await?;
        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "config fetch unsuccessful");
            return Err(FederationError::ConfigNotFound);
        }

        let body = response.text().await?;
        record_from_config(&body, domain)
    }

    /// Resolution: looks up `address` against an already-known record.
    ///
    /// The address must be exactly `local*domain` with both parts
    /// non-empty; anything else fails before any network call.
    pub async fn resolve_with(
        &self,
        record: &FederationRecord,
        address: &str,
    ) -> Result<ResolvedAddress, FederationError> {
        split_address(address)?;

        let mut url = record.server().clone();
        url.query_pairs_mut()
            .append_pair("type", "name")
            .append_pair("q", address);
        tracing::debug!(url = %url, "resolving address");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == http::StatusCode::NOT_FOUND {
            return Err(FederationError::NotFound);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "resolution server error");
            return Err(FederationError::ServerError { status });
        }

        let decoded = decode::<ResolvedAddress>(response)
            .await
            .map_err(|e| match e {
                Error::Connection(e) => FederationError::Connection(e),
                other => FederationError::Decode(other),
            })?;
        Ok(decoded.data)
    }

    /// Convenience: discovery followed by resolution in one call.
    pub async fn resolve(&self, address: &str) -> Result<ResolvedAddress, FederationError> {
        let (_, domain) = split_address(address)?;
        let record = self.discover(domain).await?;
        self.resolve_with(&record, address).await
    }
}

fn well_known_url(domain: &str) -> String {
    format!("https://{domain}/.well-known/{WELL_KNOWN_CONFIG}")
}

/// Extracts the resolution server from a fetched config document.
fn record_from_config(body: &str, domain: &str) -> Result<FederationRecord, FederationError> {
    if body.is_empty() {
        return Err(FederationError::ConfigNotFound);
    }
    let document: toml::Value =
        toml::from_str(body).map_err(|_| FederationError::ConfigNotFound)?;

    let server = document
        .get(RESOLUTION_SERVER_FIELD)
        .and_then(toml::Value::as_str)
        .ok_or(FederationError::NoResolutionServer)?;

    FederationRecord::new(server, domain)
}

/// Splits `local*domain`, requiring exactly one separator and two non-empty
/// parts.
fn split_address(address: &str) -> Result<(&str, &str), FederationError> {
    let mut parts = address.split('*');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
            Ok((local, domain))
        }
        _ => Err(FederationError::MalformedAddress(address.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_well_formed_address() {
        assert_eq!(
            split_address("bob*example.com").unwrap(),
            ("bob", "example.com")
        );
    }

    #[test]
    fn rejects_address_without_separator() {
        let err = split_address("bob@example.com").unwrap_err();
        assert!(matches!(err, FederationError::MalformedAddress(_)));
    }

    #[test]
    fn rejects_address_with_two_separators() {
        let err = split_address("a*b*c").unwrap_err();
        assert!(matches!(err, FederationError::MalformedAddress(_)));
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(split_address("*example.com").is_err());
        assert!(split_address("bob*").is_err());
        assert!(split_address("*").is_err());
    }

    #[test]
    fn well_known_url_is_fixed_form() {
        assert_eq!(
            well_known_url("example.com"),
            "https://example.com/.well-known/ledger.toml"
        );
    }

    #[test]
    fn config_with_server_yields_record() {
        let record = record_from_config(
            "RESOLUTION_SERVER = \"https://fed.example.com\"\n",
            "example.com",
        )
        .unwrap();
        assert_eq!(record.server().as_str(), "https://fed.example.com/");
        assert_eq!(record.domain(), "example.com");
    }

    #[test]
    fn config_without_server_field() {
        let err = record_from_config("OTHER = \"x\"\n", "example.com").unwrap_err();
        assert!(matches!(err, FederationError::NoResolutionServer));
    }

    #[test]
    fn empty_config_is_not_found() {
        let err = record_from_config("", "example.com").unwrap_err();
        assert!(matches!(err, FederationError::ConfigNotFound));
    }

    #[test]
    fn unparseable_config_is_not_found() {
        let err = record_from_config("{{{{", "example.com").unwrap_err();
        assert!(matches!(err, FederationError::ConfigNotFound));
    }

    #[test]
    fn config_with_insecure_server_is_invalid() {
        let err = record_from_config(
            "RESOLUTION_SERVER = \"http://fed.example.com\"\n",
            "example.com",
        )
        .unwrap_err();
        assert!(matches!(err, FederationError::InvalidServer(_)));
    }

    #[test]
    fn record_requires_https() {
        let err = FederationRecord::new("http://fed.example.com", "example.com").unwrap_err();
        assert!(matches!(err, FederationError::InvalidServer(_)));
    }

    #[test]
    fn record_rejects_loopback_http() {
        // No carve-outs; loopback is no exception.
        for uri in ["http://127.0.0.1:9000", "http://localhost:9000"] {
            let err = FederationRecord::new(uri, "example.com").unwrap_err();
            assert!(matches!(err, FederationError::InvalidServer(_)));
        }
    }

    #[test]
    fn record_rejects_garbage_uri() {
        let err = FederationRecord::new("not a uri", "example.com").unwrap_err();
        assert!(matches!(err, FederationError::InvalidServer(_)));
    }
}
