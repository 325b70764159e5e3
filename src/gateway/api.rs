use async_trait::async_trait;
use serde_json::Value;

use super::GatewayResult;

/// Raw query surface of the remote metadata API.
#[async_trait]
pub trait QueryApi: Send + Sync {
    /// GET a resource path relative to the API root, e.g. `EntityDefinitions`.
    async fn query(&self, path: &str) -> GatewayResult<Value>;

    /// Run a FetchXML query against an entity set, e.g. `solutions`.
    async fn fetch_xml(&self, entity_set: &str, fetch_xml: &str) -> GatewayResult<Value>;
}
