//! Consul health API client

use crate::client::RegistryClient;
use crate::entry::ServiceEntry;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use sextant_config::{RegistryConfig, Validate};
use tracing::debug;
use url::Url;

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul HTTP client for `/v1/health/service`
#[derive(Debug, Clone)]
pub struct ConsulClient {
    base_url: Url,
    token: Option<String>,
    datacenter: Option<String>,
    client: reqwest::Client,
}

impl ConsulClient {
    /// Create a client for the agent at `base_url`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use sextant_discovery::ConsulClient;
    ///
    /// let consul = ConsulClient::new("http://localhost:8500")?;
    /// ```
    pub fn new(base_url: &str) -> Result<Self, DiscoveryError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client that sends requests through `client`
    pub fn with_http_client(base_url: &str, client: reqwest::Client) -> Result<Self, DiscoveryError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DiscoveryError::InvalidConfiguration(format!("invalid registry url {}: {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::InvalidConfiguration(format!(
                "registry url cannot be a base: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            token: None,
            datacenter: None,
            client,
        })
    }

    /// Send `X-Consul-Token` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Query `datacenter` instead of the agent's own
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn health_url(&self, service_key: &str) -> Result<Url, DiscoveryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DiscoveryError::InvalidConfiguration(format!(
                    "registry url cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v1", "health", "service", service_key]);
        Ok(url)
    }
}

#[async_trait]
impl RegistryClient for ConsulClient {
    async fn healthy_instances(
        &self,
        service_key: &str,
        tag: &str,
        passing_only: bool,
    ) -> Result<Vec<ServiceEntry>, DiscoveryError> {
        let url = self.health_url(service_key)?;

        let mut query: Vec<(&str, &str)> = Vec::new();
        if passing_only {
            query.push(("passing", "true"));
        }
        if !tag.is_empty() {
            query.push(("tag", tag));
        }
        if let Some(dc) = &self.datacenter {
            query.push(("dc", dc.as_str()));
        }

        let mut request = self.client.get(url).query(&query);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::RegistryStatus {
                status: status.as_u16(),
                body,
            });
        }

        let entries: Vec<ServiceEntry> = response.json().await?;

        debug!(
            "Consul returned {} entries for service {}",
            entries.len(),
            service_key
        );
        Ok(entries)
    }
}

/// Builds [`ConsulClient`]s from [`RegistryConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsulClientFactory;

impl ConsulClientFactory {
    /// Validate `config` and create a client for it
    pub fn create(&self, config: &RegistryConfig) -> Result<ConsulClient, DiscoveryError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let mut client = ConsulClient::with_http_client(&config.base_url(), http)?;
        if let Some(token) = &config.token {
            client = client.with_token(token);
        }
        if let Some(datacenter) = &config.datacenter {
            client = client.with_datacenter(datacenter);
        }

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn health_payload() -> serde_json::Value {
        json!([
            {
                "Node": {"Node": "worker-1", "Address": "10.0.0.5"},
                "Service": {
                    "ID": "orders-1",
                    "Service": "orders",
                    "Tags": ["version-1.2"],
                    "Address": "",
                    "Port": 8080
                },
                "Checks": []
            }
        ])
    }

    #[test]
    fn test_consul_client_creation() {
        assert_ok!(ConsulClient::new("http://localhost:8500"));
        assert_err!(ConsulClient::new("not a url"));
        assert_err!(ConsulClient::new("mailto:ops@example.com"));
    }

    #[test]
    fn test_health_url() {
        let client = ConsulClient::new("http://localhost:8500").unwrap();
        assert_eq!(
            client.health_url("orders").unwrap().as_str(),
            "http://localhost:8500/v1/health/service/orders"
        );

        let prefixed = ConsulClient::new("http://gateway/consul/").unwrap();
        assert_eq!(
            prefixed.health_url("my service").unwrap().as_str(),
            "http://gateway/consul/v1/health/service/my%20service"
        );
    }

    #[tokio::test]
    async fn test_queries_passing_instances() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/service/orders"))
            .and(query_param("passing", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(health_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ConsulClient::new(&server.uri()).unwrap();
        let entries = client.healthy_instances("orders", "", true).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node.address, "10.0.0.5");
        assert_eq!(entries[0].service.port, 8080);

        let request = &server.received_requests().await.unwrap()[0];
        assert!(!request.url.query().unwrap_or_default().contains("tag="));
    }

    #[tokio::test]
    async fn test_sends_token_tag_and_datacenter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/service/orders"))
            .and(query_param("tag", "primary"))
            .and(query_param("dc", "dc2"))
            .and(header(TOKEN_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ConsulClient::new(&server.uri())
            .unwrap()
            .with_token("secret")
            .with_datacenter("dc2");

        let entries = client.healthy_instances("orders", "primary", true).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("No cluster leader"))
            .mount(&server)
            .await;

        let client = ConsulClient::new(&server.uri()).unwrap();
        let err = client.healthy_instances("orders", "", true).await.unwrap_err();

        match err {
            DiscoveryError::RegistryStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "No cluster leader");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = ConsulClient::new(&server.uri()).unwrap();
        let err = client.healthy_instances("orders", "", true).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Http(_)));
    }

    #[tokio::test]
    async fn test_factory_applies_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health/service/orders"))
            .and(header(TOKEN_HEADER, "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(health_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let address = server.address();
        let config = RegistryConfig::new("orders")
            .with_host(address.ip().to_string())
            .with_port(address.port())
            .with_token("abc")
            .with_timeout(Duration::from_secs(5));

        let client = ConsulClientFactory.create(&config).unwrap();
        let entries = client.healthy_instances("orders", "", true).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_factory_rejects_invalid_config() {
        let result = ConsulClientFactory.create(&RegistryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::Config(_))));
    }
}
