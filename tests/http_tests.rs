//! Tests for HTTP module functionality.

use hubfetch::http::client::{create_http_client, HttpClientConfig};
use hubfetch::hub::Dialect;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

mod common;
use common::helpers::*;

#[test]
fn test_default_config() {
    let config = HttpClientConfig::default();
    assert_eq!(config.retries, 0);
    assert!(config.proxy.is_none());
    assert!(config.headers.is_none());
}

#[test]
fn test_create_http_client_with_retries_and_proxy() {
    let config = HttpClientConfig {
        retries: 3,
        proxy: Some(reqwest::Proxy::all("http://127.0.0.1:3128").unwrap()),
        headers: None,
    };
    assert!(create_http_client(config).is_ok());
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let (hub, mock) = serve(MockHub::with_catalogue_size(Dialect::OData, 0)).await;
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(TEST_USER_AGENT));
    let client = create_http_client(HttpClientConfig {
        headers: Some(headers),
        ..HttpClientConfig::default()
    })
    .unwrap();

    let res = client
        .get(format!("{}/odata/v1/Products", hub.base_url()))
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    assert_eq!(mock.user_agents.lock().unwrap().as_slice(), [TEST_USER_AGENT]);
}
