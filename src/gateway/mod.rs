//! Metadata gateway: one remote call per metadata intent, mapped into entities.
//!
//! `MetadataGateway` is the seam the load coordinator depends on. The Web API
//! implementation sits on a `QueryApi` transport so record mapping can be
//! exercised without a network.

pub mod api;
pub mod dataverse;
pub mod error;
pub mod fetch_xml;
pub mod http;
pub mod mapping;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    host::HostBridge,
    model::{Column, Connection, Key, Privilege, Relationship, RelationshipType, Solution, Table},
};

pub use api::QueryApi;
pub use dataverse::WebApiGateway;
pub use error::{GatewayError, GatewayResult};
pub use http::{ClientConfig, HttpQueryApi};

#[async_trait]
pub trait MetadataGateway: Send + Sync {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>>;
    async fn list_columns(&self, table_logical_name: &str) -> GatewayResult<Vec<Column>>;
    async fn list_solutions(&self, managed: bool) -> GatewayResult<Vec<Solution>>;
    async fn list_solution_tables(&self, solution_unique_name: &str) -> GatewayResult<Vec<Table>>;
    async fn list_keys(&self, table: &Table) -> GatewayResult<Vec<Key>>;
    async fn list_privileges(&self, table: &Table) -> GatewayResult<Vec<Privilege>>;
    async fn list_relationships(
        &self,
        table: &Table,
        relationship_type: RelationshipType,
    ) -> GatewayResult<Vec<Relationship>>;
    async fn list_solutions_for_table(&self, table: &Table) -> GatewayResult<Vec<Solution>>;
}

/// Builds the gateway for whatever connection the host currently reports.
pub trait GatewayFactory: Send + Sync {
    fn build(&self, connection: Option<&Connection>) -> Arc<dyn MetadataGateway>;
}

/// Web API gateways over reqwest, one HTTP client per connection.
pub struct WebApiGatewayFactory {
    client: ClientConfig,
    host: Arc<dyn HostBridge>,
}

impl WebApiGatewayFactory {
    pub fn new(client: ClientConfig, host: Arc<dyn HostBridge>) -> Self {
        Self { client, host }
    }
}

impl GatewayFactory for WebApiGatewayFactory {
    fn build(&self, connection: Option<&Connection>) -> Arc<dyn MetadataGateway> {
        let api = connection.and_then(|conn| match HttpQueryApi::new(conn, &self.client) {
            Ok(api) => Some(Arc::new(api) as Arc<dyn QueryApi>),
            Err(err) => {
                tracing::error!("failed to build http client for {}: {err}", conn.name);
                None
            }
        });
        match api {
            Some(api) => Arc::new(WebApiGateway::new(
                connection.cloned(),
                api,
                Arc::clone(&self.host),
            )),
            None => Arc::new(WebApiGateway::disconnected(Arc::clone(&self.host))),
        }
    }
}
