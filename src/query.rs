//! Query descriptors: the immutable description of a single request URL.
//!
//! A [`QueryDescriptor`] collects everything needed to build a request URL —
//! base endpoint, path segments, query parameters, and pagination controls —
//! without performing any I/O. Path segments may be replaced exactly once
//! per descriptor; a second replacement fails with [`Error::IllegalReuse`].

use crate::{Error, Result};
use url::Url;

/// Sort direction for paginated collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Oldest records first.
    Asc,
    /// Newest records first.
    Desc,
}

impl Order {
    /// The wire value of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// An immutable description of a single query.
///
/// Created with a default path segment for its resource; scoped queries
/// (for example "effects of one account") replace the default segments in a
/// single shot. Query parameters accumulate and may repeat. The cursor is an
/// opaque token passed through verbatim, never parsed.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    base: Url,
    segments: Vec<String>,
    segments_replaced: bool,
    params: Vec<(String, String)>,
    cursor: Option<String>,
    limit: Option<u32>,
    order: Option<Order>,
}

impl QueryDescriptor {
    /// Creates a descriptor rooted at `base` with a default path.
    ///
    /// `default_segment` may contain `/` to seed multiple segments
    /// (for example `order_book/trades`).
    pub fn new(base: Url, default_segment: &str) -> Self {
        let segments = default_segment
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            base,
            segments,
            segments_replaced: false,
            params: Vec::new(),
            cursor: None,
            limit: None,
            order: None,
        }
    }

    /// Replaces the default path segments. One-shot: a second call fails
    /// with [`Error::IllegalReuse`].
    pub fn replace_segments<I, S>(&mut self, segments: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.segments_replaced {
            return Err(Error::IllegalReuse);
        }
        self.segments_replaced = true;
        self.segments = segments.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Appends a query parameter. Repeated keys are kept in call order.
    pub fn push_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    /// Sets the opaque pagination cursor.
    pub fn set_cursor(&mut self, token: impl Into<String>) {
        self.cursor = Some(token.into());
    }

    /// Sets the maximum number of records to return.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = Some(limit);
    }

    /// Sets the sort direction.
    pub fn set_order(&mut self, order: Order) {
        self.order = Some(order);
    }

    /// Builds the final request URL: `{base}/{segments joined}{?params}`.
    ///
    /// Building is pure and repeatable; two calls on the same descriptor
    /// yield identical URLs.
    pub fn build_url(&self) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(&self.segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
            if let Some(cursor) = &self.cursor {
                pairs.append_pair("cursor", cursor);
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(order) = self.order {
                pairs.append_pair("order", order.as_str());
            }
        }
        // An empty pair set leaves a dangling `?` otherwise.
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://ledger.example.com").unwrap()
    }

    #[test]
    fn default_segment_seeds_path() {
        let query = QueryDescriptor::new(base(), "effects");
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/effects"
        );
    }

    #[test]
    fn compound_default_segment() {
        let query = QueryDescriptor::new(base(), "order_book/trades");
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/order_book/trades"
        );
    }

    #[test]
    fn replace_segments_replaces_never_appends() {
        let mut query = QueryDescriptor::new(base(), "payments");
        query
            .replace_segments(["accounts", "GABC", "payments"])
            .unwrap();
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/accounts/GABC/payments"
        );
    }

    #[test]
    fn second_replace_is_illegal_reuse() {
        let mut query = QueryDescriptor::new(base(), "effects");
        query.replace_segments(["ledgers", "7", "effects"]).unwrap();
        let err = query
            .replace_segments(["accounts", "GABC", "effects"])
            .unwrap_err();
        assert!(matches!(err, Error::IllegalReuse));
    }

    #[test]
    fn params_accumulate_in_order() {
        let mut query = QueryDescriptor::new(base(), "assets");
        query.push_param("asset_code", "USD");
        query.push_param("asset_issuer", "GDEF");
        query.push_param("asset_code", "EUR");
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/assets?asset_code=USD&asset_issuer=GDEF&asset_code=EUR"
        );
    }

    #[test]
    fn pagination_controls_render_last() {
        let mut query = QueryDescriptor::new(base(), "ledgers");
        query.set_cursor("13537736921089");
        query.set_limit(200);
        query.set_order(Order::Desc);
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/ledgers?cursor=13537736921089&limit=200&order=desc"
        );
    }

    #[test]
    fn cursor_is_passed_through_verbatim() {
        let mut query = QueryDescriptor::new(base(), "ledgers");
        query.set_cursor("now");
        assert!(query.build_url().as_str().ends_with("cursor=now"));
    }

    #[test]
    fn build_is_repeatable() {
        let mut query = QueryDescriptor::new(base(), "transactions");
        query.set_limit(10);
        assert_eq!(query.build_url(), query.build_url());
    }

    #[test]
    fn base_path_is_preserved() {
        let base = Url::parse("https://ledger.example.com/api/v1/").unwrap();
        let query = QueryDescriptor::new(base, "accounts");
        assert_eq!(
            query.build_url().as_str(),
            "https://ledger.example.com/api/v1/accounts"
        );
    }
}
