//! Response envelopes: `{"dados": [...], "links": [...]}` for collections,
//! `{"dados": {...}}` for single resources.

use serde::Deserialize;
use serde_json::Value;

/// One page of a collection.
#[derive(Debug, Deserialize)]
pub struct Page {
    pub dados: Vec<Value>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A hypermedia link in a collection page.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Page {
    /// The server-supplied next page, if any.
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| link.href.as_str())
    }
}

/// A single resource.
#[derive(Debug, Deserialize)]
pub struct Detail {
    pub dados: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_link() {
        let page: Page = serde_json::from_value(json!({
            "dados": [{"id": 1}],
            "links": [
                {"rel": "self", "href": "https://x/a?pagina=1"},
                {"rel": "next", "href": "https://x/a?pagina=2"},
                {"rel": "last", "href": "https://x/a?pagina=9"},
            ],
        }))
        .unwrap();
        assert_eq!(page.next_href(), Some("https://x/a?pagina=2"));
    }

    #[test]
    fn test_missing_links() {
        let page: Page = serde_json::from_value(json!({"dados": []})).unwrap();
        assert!(page.next_href().is_none());
    }
}
