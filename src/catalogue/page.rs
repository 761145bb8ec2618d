//! Dialect-specific search requests and result page decoding.
//!
//! Each [`Dialect`] has its own request layout and its own typed JSON
//! envelope; both are resolved here so the paging loop only ever sees a
//! decoded [`Page`].

use crate::error::{Error, Result};
use crate::hub::Dialect;

use reqwest::Url;
use serde::Deserialize;

/// One product advertised by a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub id: String,
    pub title: String,
}

/// A decoded result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Entries in server response order.
    pub entries: Vec<CatalogueEntry>,
    /// Total match count when the dialect reports one.
    pub total_reported: Option<u64>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Query parameters of one page request.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery<'a> {
    pub filter: &'a str,
    pub order_by: &'a str,
    pub skip: usize,
    pub page_size: usize,
}

#[derive(Deserialize)]
struct ODataRoot {
    d: ODataResults,
}

#[derive(Deserialize)]
struct ODataResults {
    #[serde(default)]
    results: Vec<ODataEntry>,
}

#[derive(Deserialize)]
struct ODataEntry {
    #[serde(alias = "Id")]
    id: String,
    #[serde(alias = "Name")]
    name: String,
}

#[derive(Deserialize)]
struct OpenSearchRoot {
    feed: OpenSearchFeed,
}

#[derive(Deserialize)]
struct OpenSearchFeed {
    #[serde(rename = "opensearch:totalResults", default)]
    total_results: Option<Count>,
    #[serde(default)]
    entry: Option<OneOrMany<OpenSearchEntry>>,
}

#[derive(Deserialize)]
struct OpenSearchEntry {
    id: String,
    title: String,
}

#[derive(Deserialize)]
struct OndaRoot {
    #[serde(default)]
    value: Vec<OndaEntry>,
}

#[derive(Deserialize)]
struct OndaEntry {
    id: String,
    name: String,
}

/// DHuS returns a bare object instead of an array when a page holds one entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Totals come back either as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn value(&self) -> Option<u64> {
        match self {
            Count::Number(n) => Some(*n),
            Count::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Dialect {
    /// Builds the URL requesting one result page.
    pub fn search_url(&self, base_url: &str, query: PageQuery<'_>) -> Result<Url> {
        let base = base_url.trim_end_matches('/');
        let raw = match self {
            Dialect::OData => format!("{}/odata/v1/Products", base),
            Dialect::OpenSearch => format!("{}/search", base),
            Dialect::Onda => format!("{}/Products", base),
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", raw, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            match self {
                Dialect::OData => {
                    if !query.filter.is_empty() {
                        pairs.append_pair("$filter", query.filter);
                    }
                    if !query.order_by.is_empty() {
                        pairs.append_pair("$orderby", query.order_by);
                    }
                    pairs
                        .append_pair("$skip", &query.skip.to_string())
                        .append_pair("$top", &query.page_size.to_string())
                        .append_pair("$format", "json");
                }
                Dialect::OpenSearch => {
                    pairs
                        .append_pair("start", &query.skip.to_string())
                        .append_pair("rows", &query.page_size.to_string());
                    if !query.order_by.is_empty() {
                        pairs.append_pair("orderby", query.order_by);
                    }
                    pairs
                        .append_pair("format", "json")
                        .append_pair("q", if query.filter.is_empty() { "*" } else { query.filter });
                }
                Dialect::Onda => {
                    let filter = if query.filter.is_empty() { "*" } else { query.filter };
                    pairs.append_pair("$search", &format!("\"{}\"", filter));
                    if !query.order_by.is_empty() {
                        pairs.append_pair("$orderby", query.order_by);
                    }
                    pairs
                        .append_pair("$skip", &query.skip.to_string())
                        .append_pair("$top", &query.page_size.to_string())
                        .append_pair("$format", "json");
                }
            }
        }

        Ok(url)
    }

    /// Decodes a result page body.
    pub fn decode_page(&self, body: &[u8]) -> Result<Page> {
        let page = match self {
            Dialect::OData => {
                let root: ODataRoot = serde_json::from_slice(body)?;
                Page {
                    entries: root
                        .d
                        .results
                        .into_iter()
                        .map(|e| CatalogueEntry {
                            id: e.id,
                            title: e.name,
                        })
                        .collect(),
                    total_reported: None,
                }
            }
            Dialect::OpenSearch => {
                let root: OpenSearchRoot = serde_json::from_slice(body)?;
                Page {
                    total_reported: root.feed.total_results.as_ref().and_then(Count::value),
                    entries: root
                        .feed
                        .entry
                        .map(OneOrMany::into_vec)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|e| CatalogueEntry {
                            id: e.id,
                            title: e.title,
                        })
                        .collect(),
                }
            }
            Dialect::Onda => {
                let root: OndaRoot = serde_json::from_slice(body)?;
                Page {
                    entries: root
                        .value
                        .into_iter()
                        .map(|e| CatalogueEntry {
                            id: e.id,
                            title: e.name,
                        })
                        .collect(),
                    total_reported: None,
                }
            }
        };
        Ok(page)
    }
}
