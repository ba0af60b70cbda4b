//! Query kinds and their record shapes.
//!
//! Each resource the service exposes is a zero-sized marker implementing
//! [`QueryKind`]; list resources additionally implement [`Pageable`] and,
//! where the service pushes events for them, [`Streamable`]. Record structs
//! are thin passthroughs: a few stable identifying fields, with everything
//! else carried verbatim in `extra`.

use crate::page::Page;
use crate::request::{Pageable, QueryBuilder, QueryKind, Streamable};
use crate::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

macro_rules! query_kind {
    ($(#[$doc:meta])* $kind:ident, $segment:literal, $output:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $kind;

        impl QueryKind for $kind {
            type Output = $output;
            const DEFAULT_SEGMENT: &'static str = $segment;
        }
    };
}

query_kind!(
    /// Account queries (`GET /accounts`).
    Accounts, "accounts", Page<AccountRecord>);
query_kind!(
    /// Ledger queries (`GET /ledgers`).
    Ledgers, "ledgers", Page<LedgerRecord>);
query_kind!(
    /// Transaction queries (`GET /transactions`).
    Transactions, "transactions", Page<TransactionRecord>);
query_kind!(
    /// Operation queries (`GET /operations`).
    Operations, "operations", Page<OperationRecord>);
query_kind!(
    /// Payment queries (`GET /payments`).
    Payments, "payments", Page<OperationRecord>);
query_kind!(
    /// Effect queries (`GET /effects`).
    Effects, "effects", Page<EffectRecord>);
query_kind!(
    /// Asset queries (`GET /assets`).
    Assets, "assets", Page<AssetRecord>);
query_kind!(
    /// Payment-path search (`GET /paths`).
    Paths, "paths", Page<PathRecord>);
query_kind!(
    /// Trade aggregation queries (`GET /trade_aggregations`).
    TradeAggregations, "trade_aggregations", Page<TradeAggregationRecord>);
query_kind!(
    /// Order-book snapshot (`GET /order_book`). A point-in-time snapshot,
    /// so not pageable.
    OrderBook, "order_book", OrderBookSummary);
query_kind!(
    /// Trades snapshot (`GET /order_book/trades`). Not pageable.
    Trades, "order_book/trades", TradeSnapshot);

impl Pageable for Accounts {}
impl Pageable for Ledgers {}
impl Pageable for Transactions {}
impl Pageable for Operations {}
impl Pageable for Payments {}
impl Pageable for Effects {}
impl Pageable for Assets {}
impl Pageable for Paths {}
impl Pageable for TradeAggregations {}

impl Streamable for Transactions {
    type Event = TransactionRecord;
}
impl Streamable for Operations {
    type Event = OperationRecord;
}
impl Streamable for Payments {
    type Event = OperationRecord;
}
impl Streamable for Effects {
    type Event = EffectRecord;
}

impl QueryBuilder<Effects> {
    /// Scopes to `GET /accounts/{account}/effects`.
    pub fn for_account(self, account: impl AsRef<str>) -> Result<Self> {
        self.scoped(["accounts", account.as_ref(), "effects"])
    }

    /// Scopes to `GET /ledgers/{sequence}/effects`.
    pub fn for_ledger(self, sequence: u64) -> Result<Self> {
        self.scoped(["ledgers".to_owned(), sequence.to_string(), "effects".to_owned()])
    }

    /// Scopes to `GET /transactions/{hash}/effects`.
    pub fn for_transaction(self, hash: impl AsRef<str>) -> Result<Self> {
        self.scoped(["transactions", hash.as_ref(), "effects"])
    }

    /// Scopes to `GET /operations/{id}/effects`.
    pub fn for_operation(self, operation: u64) -> Result<Self> {
        self.scoped(["operations".to_owned(), operation.to_string(), "effects".to_owned()])
    }
}

impl QueryBuilder<Payments> {
    /// Scopes to `GET /accounts/{account}/payments`.
    pub fn for_account(self, account: impl AsRef<str>) -> Result<Self> {
        self.scoped(["accounts", account.as_ref(), "payments"])
    }

    /// Scopes to `GET /ledgers/{sequence}/payments`.
    pub fn for_ledger(self, sequence: u64) -> Result<Self> {
        self.scoped(["ledgers".to_owned(), sequence.to_string(), "payments".to_owned()])
    }

    /// Scopes to `GET /transactions/{hash}/payments`.
    pub fn for_transaction(self, hash: impl AsRef<str>) -> Result<Self> {
        self.scoped(["transactions", hash.as_ref(), "payments"])
    }
}

impl QueryBuilder<Operations> {
    /// Scopes to `GET /accounts/{account}/operations`.
    pub fn for_account(self, account: impl AsRef<str>) -> Result<Self> {
        self.scoped(["accounts", account.as_ref(), "operations"])
    }

    /// Scopes to `GET /ledgers/{sequence}/operations`.
    pub fn for_ledger(self, sequence: u64) -> Result<Self> {
        self.scoped(["ledgers".to_owned(), sequence.to_string(), "operations".to_owned()])
    }
}

impl QueryBuilder<Assets> {
    /// Filters by asset code.
    pub fn asset_code(self, code: impl Into<String>) -> Self {
        self.param("asset_code", code)
    }

    /// Filters by asset issuer.
    pub fn asset_issuer(self, issuer: impl Into<String>) -> Self {
        self.param("asset_issuer", issuer)
    }
}

impl QueryBuilder<Paths> {
    /// Sets the account the payment should arrive at.
    pub fn destination_account(self, account: impl Into<String>) -> Self {
        self.param("destination_account", account)
    }

    /// Sets the account the payment would be sent from.
    pub fn source_account(self, account: impl Into<String>) -> Self {
        self.param("source_account", account)
    }

    /// Sets the amount the destination should receive.
    pub fn destination_amount(self, amount: impl Into<String>) -> Self {
        self.param("destination_amount", amount)
    }

    /// Sets the asset the destination should receive.
    pub fn destination_asset(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("destination_asset_code", code)
            .param("destination_asset_issuer", issuer)
    }
}

impl QueryBuilder<TradeAggregations> {
    /// Sets the base asset of the pair.
    pub fn base_asset(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("base_asset_code", code)
            .param("base_asset_issuer", issuer)
    }

    /// Sets the counter asset of the pair.
    pub fn counter_asset(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("counter_asset_code", code)
            .param("counter_asset_issuer", issuer)
    }

    /// Sets the inclusive lower bound of the window, in epoch milliseconds.
    pub fn start_time(self, millis: u64) -> Self {
        self.param("start_time", millis.to_string())
    }

    /// Sets the exclusive upper bound of the window, in epoch milliseconds.
    pub fn end_time(self, millis: u64) -> Self {
        self.param("end_time", millis.to_string())
    }

    /// Sets the bucket width, in milliseconds.
    pub fn resolution(self, millis: u64) -> Self {
        self.param("resolution", millis.to_string())
    }
}

impl QueryBuilder<OrderBook> {
    /// Sets the asset being bought.
    pub fn buying(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("buying_asset_code", code)
            .param("buying_asset_issuer", issuer)
    }

    /// Sets the asset being sold.
    pub fn selling(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("selling_asset_code", code)
            .param("selling_asset_issuer", issuer)
    }
}

impl QueryBuilder<Trades> {
    /// Sets the asset being bought.
    pub fn buying(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("buying_asset_code", code)
            .param("buying_asset_issuer", issuer)
    }

    /// Sets the asset being sold.
    pub fn selling(self, code: impl Into<String>, issuer: impl Into<String>) -> Self {
        self.param("selling_asset_code", code)
            .param("selling_asset_issuer", issuer)
    }
}

/// An account on the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    /// The account identifier.
    pub id: String,
    /// Current sequence number, when reported.
    pub sequence: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One closed ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerRecord {
    /// Ledger sequence number.
    pub sequence: u64,
    /// Ledger hash.
    pub hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transaction recorded on the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: String,
    /// Sequence of the ledger that included it, when reported.
    pub ledger: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single operation (payments included).
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRecord {
    /// Operation identifier.
    pub id: String,
    /// Operation kind, as named by the service.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An effect produced by an operation.
#[derive(Debug, Clone, Deserialize)]
pub struct EffectRecord {
    /// Effect identifier.
    pub id: String,
    /// Effect kind, as named by the service.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An asset known to the service.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRecord {
    /// Asset code.
    pub asset_code: Option<String>,
    /// Issuing account.
    pub asset_issuer: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One candidate payment path.
#[derive(Debug, Clone, Deserialize)]
pub struct PathRecord {
    /// Amount the source would have to send along this path.
    pub source_amount: Option<String>,
    /// Amount the destination would receive.
    pub destination_amount: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One aggregated trade bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeAggregationRecord {
    /// Start of the bucket, in epoch milliseconds.
    pub timestamp: Option<u64>,
    /// Number of trades in the bucket.
    pub trade_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One side of the order book at one price.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceLevel {
    pub price: String,
    pub amount: String,
}

/// A point-in-time order-book snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderBookSummary {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A trades snapshot for one order book.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeSnapshot {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The service's answer to a transaction submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResult {
    /// Hash of the submitted transaction, when accepted.
    pub hash: Option<String>,
    /// Sequence of the ledger that included it, when reported.
    pub ledger: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
