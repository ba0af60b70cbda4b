//! Paged result collections.
//!
//! The service wraps list results in an envelope of `_embedded.records`
//! plus `_links` with `self`/`next`/`prev` hrefs. A [`Page`] is immutable
//! once decoded; moving forward or backward means issuing a fresh request
//! for the embedded link (see [`Client::next_page`](crate::Client::next_page)),
//! never mutating the page in place.

use serde::Deserialize;

/// One bounded slice of an ordered result collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_links")]
    links: PageLinks,
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct Embedded<T> {
    records: Vec<T>,
}

/// Navigation links attached to a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub current: Option<Link>,
    pub next: Option<Link>,
    pub prev: Option<Link>,
}

/// A single hyperlink in a page envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
}

impl<T> Page<T> {
    /// The records on this page, in server order.
    pub fn records(&self) -> &[T] {
        &self.embedded.records
    }

    /// Consumes the page, yielding its records.
    pub fn into_records(self) -> Vec<T> {
        self.embedded.records
    }

    /// The navigation links of this page.
    pub fn links(&self) -> &PageLinks {
        &self.links
    }

    /// The href of the following page, if the service advertised one.
    pub fn next_href(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    /// The href of the preceding page, if the service advertised one.
    pub fn prev_href(&self) -> Option<&str> {
        self.links.prev.as_deref()
    }
}

impl std::ops::Deref for Link {
    type Target = str;

    fn deref(&self) -> &str {
        &self.href
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    const ENVELOPE: &str = r#"{
        "_links": {
            "self": {"href": "https://l.example.com/ledgers?cursor=&limit=10"},
            "next": {"href": "https://l.example.com/ledgers?cursor=929&limit=10"},
            "prev": {"href": "https://l.example.com/ledgers?cursor=1&limit=10&order=desc"}
        },
        "_embedded": {
            "records": [{"id": "a"}, {"id": "b"}]
        }
    }"#;

    #[test]
    fn decodes_records_in_order() {
        let page: Page<Row> = serde_json::from_str(ENVELOPE).unwrap();
        assert_eq!(
            page.records(),
            &[Row { id: "a".into() }, Row { id: "b".into() }]
        );
    }

    #[test]
    fn exposes_navigation_hrefs() {
        let page: Page<Row> = serde_json::from_str(ENVELOPE).unwrap();
        assert_eq!(
            page.next_href(),
            Some("https://l.example.com/ledgers?cursor=929&limit=10")
        );
        assert!(page.prev_href().is_some());
    }

    #[test]
    fn missing_links_are_none() {
        let page: Page<Row> =
            serde_json::from_str(r#"{"_links": {}, "_embedded": {"records": []}}"#).unwrap();
        assert!(page.next_href().is_none());
        assert!(page.prev_href().is_none());
        assert!(page.records().is_empty());
    }
}
