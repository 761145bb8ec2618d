//! Catalogue hubs.
//!
//! A [`Hub`] is a remote catalogue + download service: a base URL, the
//! credentials used for HTTP Basic authentication and the query [`Dialect`]
//! it speaks. Hubs are immutable values; which one a caller works against is
//! decided by the [`Downloader`](crate::downloader::Downloader) session it
//! builds, never by shared global state.
//!
//! # Examples
//!
//! ```rust
//! use hubfetch::hub::{Dialect, Hub, HubRegistry};
//!
//! let registry = HubRegistry::new(vec![
//!     Hub::new("scihub", "https://scihub.copernicus.eu/dhus", "user", "secret", Dialect::OpenSearch),
//!     Hub::new("onda", "https://catalogue.onda-dias.eu/dias-catalogue", "user", "secret", Dialect::Onda),
//! ]);
//!
//! let hub = registry.get("onda").unwrap();
//! assert_eq!(hub.dialect(), Dialect::Onda);
//! assert_eq!(registry.describe(Some("onda")), "scihub, [onda]");
//! ```

use crate::error::{Error, Result};

use reqwest::Url;
use serde::Deserialize;
use std::fmt;

/// Query dialect spoken by a hub.
///
/// The dialect is chosen once per hub and decides both the shape of the
/// search request and the JSON envelope of each result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `odata/v1/Products?$filter=...` answering `{d:{results:[...]}}`.
    #[default]
    OData,
    /// `search?q=...` answering `{feed:{opensearch:totalResults, entry:[...]}}`.
    OpenSearch,
    /// `Products?$search="..."` answering `{value:[...]}`.
    Onda,
}

/// A remote catalogue + download endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Hub {
    id: String,
    url: String,
    username: String,
    password: String,
    #[serde(default)]
    dialect: Dialect,
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl Hub {
    /// Creates a new [`Hub`].
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        dialect: Dialect,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            username: username.into(),
            password: password.into(),
            dialect,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base URL without any trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// URL streaming the payload of product `id`.
    ///
    /// OData and OpenSearch hubs share the DHuS layout
    /// `{url}/odata/v1/Products('{id}')/$value`; Onda hubs address products
    /// without quotes directly under the base URL.
    pub fn download_url(&self, id: &str) -> Result<Url> {
        let raw = match self.dialect {
            Dialect::OData | Dialect::OpenSearch => {
                format!("{}/odata/v1/Products('{}')/$value", self.base_url(), id)
            }
            Dialect::Onda => format!("{}/Products({})/$value", self.base_url(), id),
        };
        Url::parse(&raw)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", raw, e)))
    }
}

/// The set of hubs known to the process.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubRegistry {
    #[serde(default)]
    hubs: Vec<Hub>,
}

impl HubRegistry {
    pub fn new(hubs: Vec<Hub>) -> Self {
        Self { hubs }
    }

    /// Looks a hub up by identifier.
    pub fn get(&self, id: &str) -> Result<&Hub> {
        self.hubs
            .iter()
            .find(|hub| hub.id == id)
            .ok_or_else(|| Error::HubNotFound {
                id: id.to_string(),
                available: self.ids(),
            })
    }

    /// Identifiers of every registered hub, in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.hubs.iter().map(|hub| hub.id.clone()).collect()
    }

    /// Comma separated hub list with the `selected` one in brackets.
    pub fn describe(&self, selected: Option<&str>) -> String {
        self.hubs
            .iter()
            .map(|hub| match selected {
                Some(id) if id == hub.id => format!("[{}]", hub.id),
                _ => hub.id.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(dialect: Dialect) -> Hub {
        Hub::new("test", "https://hub.example.com/dhus/", "alice", "s3cret", dialect)
    }

    #[test]
    fn test_download_url_per_dialect() {
        assert_eq!(
            hub(Dialect::OData).download_url("abc-123").unwrap().as_str(),
            "https://hub.example.com/dhus/odata/v1/Products('abc-123')/$value"
        );
        assert_eq!(
            hub(Dialect::OpenSearch).download_url("abc-123").unwrap().as_str(),
            "https://hub.example.com/dhus/odata/v1/Products('abc-123')/$value"
        );
        assert_eq!(
            hub(Dialect::Onda).download_url("abc-123").unwrap().as_str(),
            "https://hub.example.com/dhus/Products(abc-123)/$value"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let hub = Hub::new("bad", "not a url", "u", "p", Dialect::OData);
        assert!(matches!(hub.download_url("x"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", hub(Dialect::OData));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = HubRegistry::new(vec![
            Hub::new("a", "https://a.example.com", "u", "p", Dialect::OData),
            Hub::new("b", "https://b.example.com", "u", "p", Dialect::Onda),
        ]);

        assert_eq!(registry.get("b").unwrap().dialect(), Dialect::Onda);
        match registry.get("c") {
            Err(Error::HubNotFound { id, available }) => {
                assert_eq!(id, "c");
                assert_eq!(available, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected lookup result: {:?}", other),
        }
        assert_eq!(registry.describe(None), "a, b");
        assert_eq!(registry.describe(Some("a")), "[a], b");
    }

    #[test]
    fn test_registry_deserializes() {
        let registry: HubRegistry = serde_json::from_str(
            r#"{"hubs":[
                {"id":"scihub","url":"https://scihub","username":"u","password":"p","dialect":"opensearch"},
                {"id":"legacy","url":"https://legacy","username":"u","password":"p"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(registry.get("scihub").unwrap().dialect(), Dialect::OpenSearch);
        assert_eq!(registry.get("legacy").unwrap().dialect(), Dialect::OData);
    }
}
