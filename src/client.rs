//! The service entry point.
//!
//! A [`Client`] holds the base URL and the injected HTTP transport, and
//! hands out typed query builders for each resource. It is cheap to clone
//! and safe to share; every builder it produces is an independent value.

use crate::decode::{decode, Decoded};
use crate::page::Page;
use crate::request::{QueryBuilder, QueryKind};
use crate::resources::{
    Accounts, Assets, Effects, Ledgers, Operations, OrderBook, Paths, Payments, SubmitResult,
    TradeAggregations, Trades, Transactions,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A client for one ledger-query service.
///
/// # Examples
///
/// ```no_run
/// use ledger_client::{Client, Order};
///
/// # async fn example() -> Result<(), ledger_client::Error> {
/// let client = Client::builder()
///     .base_url("https://ledger.example.com")?
///     .build()?;
///
/// let page = client.ledgers().order(Order::Desc).limit(5).execute().await?;
/// for ledger in page.data.records() {
///     println!("{} {}", ledger.sequence, ledger.hash);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// Creates a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client for `base` with a default transport.
    pub fn new(base: impl AsRef<str>) -> Result<Self> {
        Self::builder().base_url(base)?.build()
    }

    fn query<K: QueryKind>(&self) -> QueryBuilder<K> {
        QueryBuilder::new(self.inner.http.clone(), self.inner.base.clone())
    }

    /// Queries accounts.
    pub fn accounts(&self) -> QueryBuilder<Accounts> {
        self.query()
    }

    /// Queries ledgers.
    pub fn ledgers(&self) -> QueryBuilder<Ledgers> {
        self.query()
    }

    /// Queries transactions.
    pub fn transactions(&self) -> QueryBuilder<Transactions> {
        self.query()
    }

    /// Queries operations.
    pub fn operations(&self) -> QueryBuilder<Operations> {
        self.query()
    }

    /// Queries payments.
    pub fn payments(&self) -> QueryBuilder<Payments> {
        self.query()
    }

    /// Queries effects.
    pub fn effects(&self) -> QueryBuilder<Effects> {
        self.query()
    }

    /// Queries assets.
    pub fn assets(&self) -> QueryBuilder<Assets> {
        self.query()
    }

    /// Searches payment paths.
    pub fn paths(&self) -> QueryBuilder<Paths> {
        self.query()
    }

    /// Queries trade aggregations.
    pub fn trade_aggregations(&self) -> QueryBuilder<TradeAggregations> {
        self.query()
    }

    /// Queries the order-book snapshot.
    pub fn order_book(&self) -> QueryBuilder<OrderBook> {
        self.query()
    }

    /// Queries the trades snapshot.
    pub fn trades(&self) -> QueryBuilder<Trades> {
        self.query()
    }

    /// Submits a signed transaction envelope.
    ///
    /// POSTs the opaque base64 `envelope` as form field `tx` to
    /// `{base}/transactions`. Envelope construction and signing are the
    /// caller's concern. A 2xx answer with no parseable body is an
    /// [`Error::EmptyBody`], never a silent empty result.
    pub async fn submit_transaction(&self, envelope: &str) -> Result<Decoded<SubmitResult>> {
        let mut url = self.inner.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("transactions");
        }

        tracing::debug!(url = %url, "submitting transaction");
        let response = self
            .inner
            .http
            .post(url)
            .form(&[("tx", envelope)])
            .send()
            .await?;
        tracing::info!(status = response.status().as_u16(), "submission response");
        decode(response).await
    }

    /// Fetches the page following `page`, or `None` when the service
    /// advertised no next link.
    ///
    /// Navigation is a fresh request for the embedded href; the given page
    /// is untouched.
    pub async fn next_page<T>(&self, page: &Page<T>) -> Result<Option<Decoded<Page<T>>>>
    where
        T: DeserializeOwned,
    {
        self.follow(page.next_href()).await
    }

    /// Fetches the page preceding `page`, or `None` when the service
    /// advertised no prev link.
    pub async fn prev_page<T>(&self, page: &Page<T>) -> Result<Option<Decoded<Page<T>>>>
    where
        T: DeserializeOwned,
    {
        self.follow(page.prev_href()).await
    }

    async fn follow<T>(&self, href: Option<&str>) -> Result<Option<Decoded<Page<T>>>>
    where
        T: DeserializeOwned,
    {
        let Some(href) = href else {
            return Ok(None);
        };
        let url = Url::parse(href)?;
        tracing::debug!(url = %url, "following page link");
        let response = self.inner.http.get(url).send().await?;
        Ok(Some(decode(response).await?))
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// The transport is always injected here — there is no process-wide client
/// to swap out for tests; pass a configured [`reqwest::Client`] instead.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base: Option<Url>,
    http: Option<reqwest::Client>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the service. Required.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Supplies a preconfigured transport. Overrides [`timeout`](Self::timeout).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the per-request timeout on the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or the transport could
    /// not be constructed.
    pub fn build(self) -> Result<Client> {
        let base = self
            .base
            .ok_or_else(|| Error::Configuration("base URL is required".to_owned()))?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    Error::Configuration(format!("failed to build HTTP client: {e}"))
                })?
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner { http, base }),
        })
    }
}
