use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    host::{HostBridge, Severity},
    model::{Column, Connection, Key, Privilege, Relationship, RelationshipType, Solution, Table},
};

use super::{
    GatewayError, GatewayResult, MetadataGateway, QueryApi, fetch_xml,
    mapping::{self, RawRecord},
};

/// Solution component type code for tables.
const TABLE_COMPONENT_TYPE: u32 = 1;

#[derive(Clone)]
pub struct WebApiGateway {
    connection: Option<Connection>,
    api: Option<Arc<dyn QueryApi>>,
    host: Arc<dyn HostBridge>,
}

impl WebApiGateway {
    pub fn new(
        connection: Option<Connection>,
        api: Arc<dyn QueryApi>,
        host: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            connection,
            api: Some(api),
            host,
        }
    }

    /// A gateway that rejects every call with `NoConnection`.
    pub fn disconnected(host: Arc<dyn HostBridge>) -> Self {
        Self {
            connection: None,
            api: None,
            host,
        }
    }

    fn api(&self) -> GatewayResult<&dyn QueryApi> {
        match (&self.connection, &self.api) {
            (Some(connection), Some(api)) if connection.is_active => Ok(api.as_ref()),
            _ => Err(GatewayError::NoConnection),
        }
    }

    async fn records(&self, path: &str) -> GatewayResult<Vec<RawRecord>> {
        let api = self.api()?;
        mapping::collection(api.query(path).await?)
    }

    fn announce(&self, message: String) {
        self.host.log(&message, Severity::Info);
    }

    async fn lookup_table(&self, api: &dyn QueryApi, object_id: &str) -> GatewayResult<Table> {
        let id = Uuid::parse_str(object_id).map_err(|_| GatewayError::InvalidId {
            table: "solution component".to_string(),
            id: object_id.to_string(),
        })?;
        let record = mapping::single(api.query(&format!("EntityDefinitions({id})")).await?)?;
        let logical_name = record
            .get("LogicalName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| object_id.to_string());
        Ok(mapping::table_with_name(&record, logical_name))
    }
}

fn metadata_id(table: &Table) -> GatewayResult<Uuid> {
    Uuid::parse_str(table.metadata_id.trim()).map_err(|_| GatewayError::InvalidId {
        table: table.logical_name.clone(),
        id: table.metadata_id.clone(),
    })
}

/// Escapes a value for use inside an OData single-quoted literal.
fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn component_object_id(record: &RawRecord) -> Option<String> {
    match record.get("objectid")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(inner) => inner
            .get("Id")
            .or_else(|| inner.get("objectid"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[async_trait]
impl MetadataGateway for WebApiGateway {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        self.announce("Fetching table metadata...".to_string());
        let records = self
            .records("EntityDefinitions")
            .await
            .inspect_err(|err| tracing::error!("failed to fetch table metadata: {err}"))?;
        Ok(records.iter().map(mapping::table_from_record).collect())
    }

    async fn list_columns(&self, table_logical_name: &str) -> GatewayResult<Vec<Column>> {
        self.announce(format!(
            "Fetching column metadata for table: {table_logical_name}"
        ));
        let path = format!(
            "EntityDefinitions(LogicalName='{}')/Attributes",
            odata_literal(table_logical_name)
        );
        let records = self.records(&path).await.inspect_err(|err| {
            tracing::error!("failed to fetch columns for {table_logical_name}: {err}")
        })?;
        Ok(records.iter().map(mapping::column_from_record).collect())
    }

    async fn list_solutions(&self, managed: bool) -> GatewayResult<Vec<Solution>> {
        self.announce("Fetching solutions...".to_string());
        let path = format!(
            "solutions?$filter=(isvisible eq true) and ismanaged eq {managed}\
             &$select=friendlyname,uniquename&$orderby=createdon desc"
        );
        let records = self
            .records(&path)
            .await
            .inspect_err(|err| tracing::error!("failed to fetch solutions: {err}"))?;
        Ok(records.iter().map(mapping::solution_from_record).collect())
    }

    async fn list_solution_tables(&self, solution_unique_name: &str) -> GatewayResult<Vec<Table>> {
        let api = self.api()?;
        self.announce(format!(
            "Fetching tables for solution: {solution_unique_name}"
        ));
        let path = format!(
            "solutioncomponents?$select=objectid&$filter=(componenttype eq {TABLE_COMPONENT_TYPE}) \
             and (solutionid/uniquename eq '{}')",
            odata_literal(solution_unique_name)
        );
        let components = api
            .query(&path)
            .await
            .and_then(mapping::collection)
            .inspect_err(|err| {
                tracing::error!("failed to fetch components of {solution_unique_name}: {err}")
            })?;

        let object_ids: Vec<String> = components.iter().filter_map(component_object_id).collect();
        let lookups = object_ids.iter().map(|object_id| async move {
            (object_id, self.lookup_table(api, object_id).await)
        });

        let mut tables = Vec::with_capacity(object_ids.len());
        for (object_id, result) in join_all(lookups).await {
            match result {
                Ok(table) => tables.push(table),
                Err(err) => self.host.log(
                    &format!("Failed to fetch entity metadata for id {object_id}: {err}"),
                    Severity::Warning,
                ),
            }
        }
        Ok(tables)
    }

    async fn list_keys(&self, table: &Table) -> GatewayResult<Vec<Key>> {
        self.announce(format!(
            "Fetching keys metadata for table: {}",
            table.logical_name
        ));
        let path = format!("EntityDefinitions({})/Keys", metadata_id(table)?);
        let records = self.records(&path).await.inspect_err(|err| {
            tracing::error!("failed to fetch keys for {}: {err}", table.logical_name)
        })?;
        Ok(records.iter().map(mapping::key_from_record).collect())
    }

    async fn list_privileges(&self, table: &Table) -> GatewayResult<Vec<Privilege>> {
        self.announce(format!(
            "Fetching privileges metadata for table: {}",
            table.logical_name
        ));
        let path = format!("EntityDefinitions({})/Privileges", metadata_id(table)?);
        let records = self.records(&path).await.inspect_err(|err| {
            tracing::error!("failed to fetch privileges for {}: {err}", table.logical_name)
        })?;
        Ok(records.iter().map(mapping::privilege_from_record).collect())
    }

    async fn list_relationships(
        &self,
        table: &Table,
        relationship_type: RelationshipType,
    ) -> GatewayResult<Vec<Relationship>> {
        self.announce(format!(
            "Fetching relationships metadata for table: {} type: {relationship_type}",
            table.logical_name
        ));
        let path = format!(
            "EntityDefinitions({})/{}",
            metadata_id(table)?,
            relationship_type.path_segment()
        );
        let records = self.records(&path).await.inspect_err(|err| {
            tracing::error!(
                "failed to fetch {relationship_type} for {}: {err}",
                table.logical_name
            )
        })?;
        Ok(records
            .iter()
            .map(|record| mapping::relationship_from_record(record, relationship_type))
            .collect())
    }

    async fn list_solutions_for_table(&self, table: &Table) -> GatewayResult<Vec<Solution>> {
        let api = self.api()?;
        self.announce(format!(
            "Fetching solutions metadata for table: {}",
            table.logical_name
        ));
        let query = fetch_xml::solutions_containing(&metadata_id(table)?);
        let payload = api.fetch_xml("solutions", &query).await.inspect_err(|err| {
            tracing::error!("failed to fetch solutions for {}: {err}", table.logical_name)
        })?;
        Ok(mapping::collection(payload)?
            .iter()
            .map(mapping::solution_from_record)
            .collect())
    }
}
