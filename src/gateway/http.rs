use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use serde_json::Value;

use crate::model::Connection;

use super::{GatewayError, GatewayResult, QueryApi};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_version: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_version: "9.2".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// `QueryApi` over the Dataverse Web API using a bearer token.
#[derive(Clone)]
pub struct HttpQueryApi {
    http: Client,
    base_url: String,
    access_token: String,
}

impl HttpQueryApi {
    pub fn new(connection: &Connection, cfg: &ClientConfig) -> GatewayResult<Self> {
        let http = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: api_root(&connection.environment_url, &cfg.api_version),
            access_token: connection.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0");
        if self.access_token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.access_token)
        }
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = remote_error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string()
        });
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl QueryApi for HttpQueryApi {
    async fn query(&self, path: &str) -> GatewayResult<Value> {
        tracing::debug!("GET {path}");
        self.send(self.get(path)).await
    }

    async fn fetch_xml(&self, entity_set: &str, fetch_xml: &str) -> GatewayResult<Value> {
        tracing::debug!("GET {entity_set} (fetchXml)");
        self.send(self.get(entity_set).query(&[("fetchXml", fetch_xml)]))
            .await
    }
}

fn api_root(environment_url: &str, api_version: &str) -> String {
    format!(
        "{}/api/data/v{}/",
        environment_url.trim_end_matches('/'),
        api_version.trim_start_matches('v')
    )
}

/// Pulls `error.message` out of an OData error body.
fn remote_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, HttpQueryApi, api_root, remote_error_message};
    use crate::model::Connection;

    #[test]
    fn api_root_normalises_slashes_and_version_prefix() {
        assert_eq!(
            api_root("https://org.crm.dynamics.com/", "v9.2"),
            "https://org.crm.dynamics.com/api/data/v9.2/"
        );
        assert_eq!(
            api_root("https://org.crm.dynamics.com", "9.1"),
            "https://org.crm.dynamics.com/api/data/v9.1/"
        );
    }

    #[test]
    fn odata_error_message_is_extracted() {
        let body = r#"{"error":{"code":"0x80060888","message":"Resource not found for the segment 'Nope'."}}"#;
        assert_eq!(
            remote_error_message(body).as_deref(),
            Some("Resource not found for the segment 'Nope'.")
        );
        assert_eq!(remote_error_message("<html>gateway timeout</html>"), None);
    }

    #[test]
    fn client_uses_connection_url() {
        let connection = Connection::new("dev", "https://dev.crm.dynamics.com").with_token("t");
        let api = HttpQueryApi::new(&connection, &ClientConfig::default()).expect("build client");
        assert_eq!(api.base_url(), "https://dev.crm.dynamics.com/api/data/v9.2/");
    }
}
