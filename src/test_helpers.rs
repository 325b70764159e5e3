//! In-memory collaborators for unit and integration tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::{
    gateway::{GatewayError, GatewayFactory, GatewayResult, MetadataGateway, QueryApi},
    host::{HostBridge, HostError, LogEntry, Notification, Severity},
    model::{
        Column, Connection, Key, Privilege, Relationship, RelationshipType, Solution, Table,
    },
};

/// Canned Web API responses keyed by request path (or entity set for FetchXML).
#[derive(Default)]
pub struct FakeQueryApi {
    routes: HashMap<String, Result<Value, String>>,
    calls: Mutex<Vec<String>>,
    fetch_xml_queries: Mutex<Vec<String>>,
}

impl FakeQueryApi {
    pub fn with_response(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(path.to_string(), Ok(body));
        self
    }

    pub fn with_failure(mut self, path: &str, message: &str) -> Self {
        self.routes.insert(path.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn fetch_xml_queries(&self) -> Vec<String> {
        self.fetch_xml_queries
            .lock()
            .expect("fetch xml mutex poisoned")
            .clone()
    }

    fn respond(&self, route: &str) -> GatewayResult<Value> {
        match self.routes.get(route) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(GatewayError::remote(message.as_str())),
            None => Err(GatewayError::Status {
                status: 404,
                message: format!("no canned response for {route}"),
            }),
        }
    }
}

#[async_trait]
impl QueryApi for FakeQueryApi {
    async fn query(&self, path: &str) -> GatewayResult<Value> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(path.to_string());
        self.respond(path)
    }

    async fn fetch_xml(&self, entity_set: &str, fetch_xml: &str) -> GatewayResult<Value> {
        self.fetch_xml_queries
            .lock()
            .expect("fetch xml mutex poisoned")
            .push(fetch_xml.to_string());
        self.respond(entity_set)
    }
}

/// Host that keeps everything in memory, including saved files.
#[derive(Default)]
pub struct RecordingHost {
    notifications: Mutex<Vec<Notification>>,
    logs: Mutex<Vec<LogEntry>>,
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingHost {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.lock().expect("log mutex poisoned").clone()
    }

    pub fn logs_with(&self, severity: Severity) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.severity == severity)
            .map(|entry| entry.message)
            .collect()
    }

    pub fn saved_files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().expect("file mutex poisoned").clone()
    }

    pub fn saved(&self, file_name: &str) -> Option<Vec<u8>> {
        self.saved_files()
            .into_iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, contents)| contents)
    }

    pub fn saved_text(&self, file_name: &str) -> Option<String> {
        self.saved(file_name)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl HostBridge for RecordingHost {
    fn notify(&self, title: &str, body: &str, severity: Severity) {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .push(Notification {
                at: Utc::now(),
                title: title.to_string(),
                body: body.to_string(),
                severity,
            });
    }

    fn log(&self, message: &str, severity: Severity) {
        self.logs.lock().expect("log mutex poisoned").push(LogEntry {
            at: Utc::now(),
            message: message.to_string(),
            severity,
        });
    }

    async fn save_file(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, HostError> {
        if file_name.trim().is_empty() {
            return Err(HostError::InvalidFileName(file_name.to_string()));
        }
        self.files
            .lock()
            .expect("file mutex poisoned")
            .push((file_name.to_string(), contents.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// Gateway answering from fixed data. Calls are recorded as `method` or
/// `method:table[:type]`; anything not scripted answers with an empty list.
#[derive(Default)]
pub struct ScriptedGateway {
    tables: Vec<Table>,
    solution_tables: HashMap<String, Vec<Table>>,
    solutions: Vec<Solution>,
    columns: HashMap<String, Vec<Column>>,
    keys: HashMap<String, Vec<Key>>,
    privileges: HashMap<String, Vec<Privilege>>,
    relationships: HashMap<(String, RelationshipType), Vec<Relationship>>,
    table_solutions: HashMap<String, Vec<Solution>>,
    failures: HashMap<String, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_solution_tables(mut self, unique_name: &str, tables: Vec<Table>) -> Self {
        self.solution_tables.insert(unique_name.to_string(), tables);
        self
    }

    pub fn with_solutions(mut self, solutions: Vec<Solution>) -> Self {
        self.solutions = solutions;
        self
    }

    pub fn with_columns(mut self, table: &str, columns: Vec<Column>) -> Self {
        self.columns.insert(table.to_string(), columns);
        self
    }

    pub fn with_keys(mut self, table: &str, keys: Vec<Key>) -> Self {
        self.keys.insert(table.to_string(), keys);
        self
    }

    pub fn with_privileges(mut self, table: &str, privileges: Vec<Privilege>) -> Self {
        self.privileges.insert(table.to_string(), privileges);
        self
    }

    pub fn with_relationships(
        mut self,
        table: &str,
        relationship_type: RelationshipType,
        relationships: Vec<Relationship>,
    ) -> Self {
        self.relationships
            .insert((table.to_string(), relationship_type), relationships);
        self
    }

    pub fn with_table_solutions(mut self, table: &str, solutions: Vec<Solution>) -> Self {
        self.table_solutions.insert(table.to_string(), solutions);
        self
    }

    /// Makes the call recorded as `label` fail with `GatewayError::Remote(message)`.
    pub fn failing(mut self, label: &str, message: &str) -> Self {
        self.failures.insert(label.to_string(), message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn call_count(&self, label: &str) -> usize {
        self.calls().iter().filter(|call| *call == label).count()
    }

    async fn answer<T: Clone>(
        &self,
        label: String,
        scripted: Option<&Vec<T>>,
    ) -> GatewayResult<Vec<T>> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(label.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.get(&label) {
            Some(message) => Err(GatewayError::remote(message.as_str())),
            None => Ok(scripted.cloned().unwrap_or_default()),
        }
    }
}

#[async_trait]
impl MetadataGateway for ScriptedGateway {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        self.answer("list_tables".into(), Some(&self.tables)).await
    }

    async fn list_columns(&self, table_logical_name: &str) -> GatewayResult<Vec<Column>> {
        self.answer(
            format!("list_columns:{table_logical_name}"),
            self.columns.get(table_logical_name),
        )
        .await
    }

    async fn list_solutions(&self, managed: bool) -> GatewayResult<Vec<Solution>> {
        let scripted: Vec<Solution> = self
            .solutions
            .iter()
            .filter(|s| s.is_managed == managed)
            .cloned()
            .collect();
        self.answer(format!("list_solutions:{managed}"), Some(&scripted))
            .await
    }

    async fn list_solution_tables(&self, solution_unique_name: &str) -> GatewayResult<Vec<Table>> {
        self.answer(
            format!("list_solution_tables:{solution_unique_name}"),
            self.solution_tables.get(solution_unique_name),
        )
        .await
    }

    async fn list_keys(&self, table: &Table) -> GatewayResult<Vec<Key>> {
        self.answer(
            format!("list_keys:{}", table.logical_name),
            self.keys.get(&table.logical_name),
        )
        .await
    }

    async fn list_privileges(&self, table: &Table) -> GatewayResult<Vec<Privilege>> {
        self.answer(
            format!("list_privileges:{}", table.logical_name),
            self.privileges.get(&table.logical_name),
        )
        .await
    }

    async fn list_relationships(
        &self,
        table: &Table,
        relationship_type: RelationshipType,
    ) -> GatewayResult<Vec<Relationship>> {
        self.answer(
            format!("list_relationships:{}:{relationship_type}", table.logical_name),
            self.relationships
                .get(&(table.logical_name.clone(), relationship_type)),
        )
        .await
    }

    async fn list_solutions_for_table(&self, table: &Table) -> GatewayResult<Vec<Solution>> {
        self.answer(
            format!("list_solutions_for_table:{}", table.logical_name),
            self.table_solutions.get(&table.logical_name),
        )
        .await
    }
}

/// Hands out the same scripted gateway for every connection.
pub struct ScriptedGatewayFactory {
    gateway: std::sync::Arc<ScriptedGateway>,
    built_for: Mutex<Vec<Option<String>>>,
}

impl ScriptedGatewayFactory {
    pub fn new(gateway: std::sync::Arc<ScriptedGateway>) -> Self {
        Self {
            gateway,
            built_for: Mutex::new(Vec::new()),
        }
    }

    /// Connection names the factory was asked to build for, in order.
    pub fn built_for(&self) -> Vec<Option<String>> {
        self.built_for
            .lock()
            .expect("factory mutex poisoned")
            .clone()
    }
}

impl GatewayFactory for ScriptedGatewayFactory {
    fn build(&self, connection: Option<&Connection>) -> std::sync::Arc<dyn MetadataGateway> {
        self.built_for
            .lock()
            .expect("factory mutex poisoned")
            .push(connection.map(|c| c.name.clone()));
        self.gateway.clone()
    }
}
