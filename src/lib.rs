//! # ledger-client - a client for a ledger-query HTTP service
//!
//! This crate speaks the HTTP/JSON query protocol of a remote ledger
//! service: building resource URLs, paging through result collections,
//! consuming long-lived server-sent-event subscriptions, and surfacing the
//! service's rate-limit signals. It also implements the companion
//! federation protocol that maps human-readable addresses
//! (`bob*example.com`) to account identifiers via a well-known config
//! document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ledger_client::{Client, Order};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ledger_client::Error> {
//!     let client = Client::builder()
//!         .base_url("https://ledger.example.com")?
//!         .build()?;
//!
//!     // Page through recent payments for one account.
//!     let page = client
//!         .payments()
//!         .for_account("GABC")?
//!         .order(Order::Desc)
//!         .limit(20)
//!         .execute()
//!         .await?;
//!
//!     for payment in page.data.records() {
//!         println!("{}", payment.id);
//!     }
//!
//!     // Fetch the next page by following the embedded link.
//!     if let Some(next) = client.next_page(&page.data).await? {
//!         println!("{} more records", next.data.records().len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! List resources that the service pushes can be consumed as a live
//! subscription instead of polling. Events arrive in server-send order.
//! A refused or failed connect ends the session after reporting the
//! cause; after an established connection drops, the sink's
//! [`EventSink::on_disconnected`] decides whether to reconnect:
//!
//! ```no_run
//! use ledger_client::{Client, resources::OperationRecord};
//!
//! # async fn example() -> Result<(), ledger_client::Error> {
//! # let client = Client::builder().base_url("https://ledger.example.com")?.build()?;
//! let mut session = client
//!     .payments()
//!     .stream(|payment: OperationRecord| {
//!         println!("payment {}", payment.id);
//!     });
//!
//! // ... later
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Address resolution
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
//!
//! ## Design notes
//!
//! - Every failure is a typed error surfaced to the immediate caller; the
//!   crate never retries internally. Rate limits come back as
//!   [`Error::RateLimited`] with the service's advised wait so the caller
//!   can implement its own policy.
//! - The HTTP transport is injected ([`ClientBuilder::http_client`],
//!   [`FederationResolver::with_http_client`]); there is no global state.
//! - Pagination is a capability of the query kind, checked at compile
//!   time: snapshot resources such as the order book have no `cursor`,
//!   `limit`, or `order` methods to call.

mod client;
mod decode;
mod error;
pub mod federation;
mod page;
mod query;
mod request;
pub mod resources;
mod stream;

pub use client::{Client, ClientBuilder};
pub use decode::{decode, Decoded, RateLimitSnapshot};
pub use error::{Error, FederationError, Result};
pub use federation::{FederationRecord, FederationResolver, ResolvedAddress};
pub use page::{Link, Page, PageLinks};
pub use query::{Order, QueryDescriptor};
pub use request::{Pageable, QueryBuilder, QueryKind, Streamable};
pub use stream::{EventSink, StreamSession};
