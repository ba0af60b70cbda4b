//! The generic query builder shared by every resource.
//!
//! A [`QueryBuilder`] pairs a [`QueryDescriptor`] with the injected HTTP
//! transport and a zero-sized query-kind marker. Filters and pagination are
//! fluent setters; [`QueryBuilder::execute`] issues exactly one GET and runs
//! the response through [`decode`](crate::decode::decode). There are no
//! retries at this layer; retry policy is the caller's.
//!
//! Capability is expressed in the type system: pagination setters exist
//! only for kinds implementing [`Pageable`], and [`QueryBuilder::stream`]
//! only for kinds implementing [`Streamable`]. A snapshot resource such as
//! the order book simply has no `cursor` method to misuse.

use crate::decode::{decode, Decoded};
use crate::query::{Order, QueryDescriptor};
use crate::stream::{spawn_stream, EventSink, StreamSession};
use crate::Result;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use url::Url;

/// A marker describing one kind of query against the service.
pub trait QueryKind {
    /// The decoded shape of a successful `execute()`.
    type Output: DeserializeOwned;

    /// The path segment this kind queries by default.
    const DEFAULT_SEGMENT: &'static str;
}

/// Kinds whose collections paginate with cursor/limit/order.
pub trait Pageable: QueryKind {}

/// Kinds that can also be consumed as a push subscription.
pub trait Streamable: QueryKind {
    /// The decoded shape of a single pushed event.
    type Event: DeserializeOwned + Send + 'static;
}

/// A fluent, consumable builder for one query.
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
/// let page = client
///     .payments()
///     .for_account("GABC")?
///     .cursor("now")
///     .limit(50)
///     .order(Order::Asc)
///     .execute()
///     .await?;
///
/// for payment in page.data.records() {
///     println!("{}", payment.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<K: QueryKind> {
    http: reqwest::Client,
    descriptor: QueryDescriptor,
    _kind: PhantomData<K>,
}

impl<K: QueryKind> QueryBuilder<K> {
    pub(crate) fn new(http: reqwest::Client, base: Url) -> Self {
        Self {
            http,
            descriptor: QueryDescriptor::new(base, K::DEFAULT_SEGMENT),
            _kind: PhantomData,
        }
    }

    /// Appends a raw query parameter. Repeated keys accumulate.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.push_param(key, value);
        self
    }

    /// Replaces the default path segments with a scoped path. One-shot;
    /// a second replacement fails with [`Error::IllegalReuse`](crate::Error::IllegalReuse).
    pub(crate) fn scoped<I, S>(mut self, segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.replace_segments(segments)?;
        Ok(self)
    }

    /// The URL this builder would request right now.
    pub fn url(&self) -> Url {
        self.descriptor.build_url()
    }

    /// Issues the query: exactly one GET, classified and decoded uniformly.
    pub async fn execute(&self) -> Result<Decoded<K::Output>> {
        let url = self.descriptor.build_url();
        tracing::debug!(url = %url, "executing query");
        let response = self.http.get(url).send().await?;
        tracing::info!(status = response.status().as_u16(), "received response");
        decode(response).await
    }
}

impl<K: Pageable> QueryBuilder<K> {
    /// Sets the opaque pagination cursor.
    pub fn cursor(mut self, token: impl Into<String>) -> Self {
        self.descriptor.set_cursor(token);
        self
    }

    /// Sets the maximum number of records per page.
    pub fn limit(mut self, limit: u32) -> Self {
        self.descriptor.set_limit(limit);
        self
    }

    /// Sets the sort direction.
    pub fn order(mut self, order: Order) -> Self {
        self.descriptor.set_order(order);
        self
    }
}

impl<K: Streamable> QueryBuilder<K> {
    /// Opens a push subscription on this query's resource path.
    ///
    /// Events are decoded one at a time with the same shape as the
    /// single-resource decode path and handed to `sink` in server-send
    /// order. The returned [`StreamSession`] owns the connection; drop it
    /// or call [`StreamSession::close`] to stop.
    pub fn stream<S>(&self, sink: S) -> StreamSession
    where
        S: EventSink<K::Event>,
    {
        spawn_stream::<K::Event, S>(self.http.clone(), self.descriptor.build_url(), sink)
    }
}
