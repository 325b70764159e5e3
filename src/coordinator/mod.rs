//! Lazy load coordinator.
//!
//! Every collection the browser shows is fetched on first need and at most once
//! per view-model generation: a load is skipped while its collection already has
//! items, while an identical load is in flight, or after it completed (even with
//! zero items). `reload_*` is the explicit user refresh and bypasses those checks.

pub mod cache;

use std::sync::Arc;

use futures_util::future::join_all;

use crate::{
    gateway::{GatewayResult, MetadataGateway},
    host::{HostBridge, Severity},
    model::{Aspect, Connection, RelationshipType, Table},
    view_model::{Action, Change, ViewModelStore},
};

pub use cache::{Busy, LoadCache, LoadKey, LoadState};

pub const NO_CONNECTION_TITLE: &str = "No Connection";
pub const NO_CONNECTION_BODY: &str = "Please connect to a Dataverse environment";

/// Which table list to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableScope {
    All,
    Solution(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// Collection already populated or already loaded in this generation.
    Skipped,
    InFlight,
    NoConnection,
    UnknownTable,
    /// Fetched, but the view-model was reset before the result arrived.
    Stale,
    Failed(String),
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_) | LoadOutcome::NoConnection)
    }
}

pub struct LoadCoordinator {
    store: ViewModelStore,
    gateway: Arc<dyn MetadataGateway>,
    host: Arc<dyn HostBridge>,
    connection: Option<Connection>,
    cache: LoadCache,
}

impl LoadCoordinator {
    pub fn new(
        store: ViewModelStore,
        gateway: Arc<dyn MetadataGateway>,
        host: Arc<dyn HostBridge>,
        connection: Option<Connection>,
    ) -> Self {
        Self {
            store,
            gateway,
            host,
            connection,
            cache: LoadCache::default(),
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn state(&self, key: &LoadKey) -> LoadState {
        self.cache.state(key)
    }

    fn preflight(&self) -> bool {
        if self.connection.as_ref().is_some_and(|c| c.is_active) {
            return true;
        }
        self.host
            .notify(NO_CONNECTION_TITLE, NO_CONNECTION_BODY, Severity::Warning);
        false
    }

    pub async fn load_tables(&self, scope: TableScope) -> LoadOutcome {
        self.run_table_list(scope, false).await
    }

    pub async fn reload_tables(&self, scope: TableScope) -> LoadOutcome {
        self.run_table_list(scope, true).await
    }

    async fn run_table_list(&self, scope: TableScope, force: bool) -> LoadOutcome {
        if !self.preflight() {
            return LoadOutcome::NoConnection;
        }
        let epoch = self.store.epoch();
        if !force && self.store.read(|vm| !vm.tables().is_empty()) {
            return LoadOutcome::Skipped;
        }

        let key = LoadKey::table_list(epoch);
        if let Err(busy) = self.cache.begin(&key, force) {
            return busy_outcome(busy);
        }

        let fetched = match &scope {
            TableScope::All => self.gateway.list_tables().await,
            TableScope::Solution(name) => self.gateway.list_solution_tables(name).await,
        };
        match fetched {
            Ok(tables) => {
                let count = tables.len();
                if self.store.dispatch(Action::TablesLoaded { epoch, tables }) == Change::Stale {
                    self.cache.clear(&key);
                    return LoadOutcome::Stale;
                }
                self.cache.finish(&key, LoadState::Loaded { count });
                let source = self
                    .connection
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or_default();
                self.host
                    .log(&format!("Loaded {count} tables from {source}"), Severity::Info);
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                let message = err.to_string();
                self.cache.finish(
                    &key,
                    LoadState::Failed {
                        message: message.clone(),
                    },
                );
                self.host
                    .log(&format!("Error loading tables: {message}"), Severity::Error);
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Refreshes the solution picker. Not generation-scoped: the picker survives
    /// a solution switch.
    pub async fn load_solutions(&self, managed: bool) -> LoadOutcome {
        if !self.preflight() {
            return LoadOutcome::NoConnection;
        }
        match self.gateway.list_solutions(managed).await {
            Ok(solutions) => {
                let count = solutions.len();
                self.store.dispatch(Action::SolutionsLoaded(solutions));
                self.host
                    .log(&format!("Loaded {count} solutions"), Severity::Info);
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                let message = err.to_string();
                self.host.log(
                    &format!("Error loading solutions: {message}"),
                    Severity::Error,
                );
                LoadOutcome::Failed(message)
            }
        }
    }

    pub async fn load_columns(&self, table: &str) -> LoadOutcome {
        self.run_aspect(table, Aspect::Columns, false).await
    }

    pub async fn load_keys(&self, table: &str) -> LoadOutcome {
        self.run_aspect(table, Aspect::Keys, false).await
    }

    pub async fn load_privileges(&self, table: &str) -> LoadOutcome {
        self.run_aspect(table, Aspect::Privileges, false).await
    }

    pub async fn load_relationships(
        &self,
        table: &str,
        relationship_type: RelationshipType,
    ) -> LoadOutcome {
        self.run_aspect(table, Aspect::Relationships(relationship_type), false)
            .await
    }

    pub async fn load_solutions_for_table(&self, table: &str) -> LoadOutcome {
        self.run_aspect(table, Aspect::Solutions, false).await
    }

    pub async fn load(&self, table: &str, aspect: Aspect) -> LoadOutcome {
        self.run_aspect(table, aspect, false).await
    }

    pub async fn reload(&self, table: &str, aspect: Aspect) -> LoadOutcome {
        self.run_aspect(table, aspect, true).await
    }

    /// Loads `aspects` of one table concurrently; completion order is unspecified.
    pub async fn ensure_table_loaded(
        &self,
        table: &str,
        aspects: &[Aspect],
    ) -> Vec<(Aspect, LoadOutcome)> {
        let loads = aspects
            .iter()
            .map(|aspect| async move { (*aspect, self.load(table, *aspect).await) });
        join_all(loads).await
    }

    async fn run_aspect(&self, name: &str, aspect: Aspect, force: bool) -> LoadOutcome {
        if aspect == Aspect::Tables {
            return self.run_table_list(self.current_scope(), force).await;
        }
        if !self.preflight() {
            return LoadOutcome::NoConnection;
        }

        let (epoch, target) = self.store.read(|vm| {
            (
                vm.epoch(),
                vm.table(name).map(|t| (request_handle(t), t.has_aspect(aspect))),
            )
        });
        let Some((table, populated)) = target else {
            return LoadOutcome::UnknownTable;
        };
        if populated && !force {
            return LoadOutcome::Skipped;
        }

        let key = LoadKey::new(epoch, name, aspect);
        if let Err(busy) = self.cache.begin(&key, force) {
            return busy_outcome(busy);
        }

        match self.fetch(epoch, &table, aspect).await {
            Ok((count, action)) => {
                if self.store.dispatch(action) == Change::Stale {
                    self.cache.clear(&key);
                    return LoadOutcome::Stale;
                }
                self.cache.finish(&key, LoadState::Loaded { count });
                self.host.log(
                    &format!("Loaded {count} {aspect} for table: {name}"),
                    Severity::Info,
                );
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                let message = err.to_string();
                self.cache.finish(
                    &key,
                    LoadState::Failed {
                        message: message.clone(),
                    },
                );
                self.host.log(
                    &format!("Error loading {aspect} for table {name}: {message}"),
                    Severity::Error,
                );
                LoadOutcome::Failed(message)
            }
        }
    }

    async fn fetch(
        &self,
        epoch: u64,
        table: &Table,
        aspect: Aspect,
    ) -> GatewayResult<(usize, Action)> {
        let name = table.logical_name.clone();
        let gateway = &self.gateway;
        Ok(match aspect {
            Aspect::Columns => {
                let items = gateway.list_columns(&table.logical_name).await?;
                (items.len(), Action::ColumnsLoaded { epoch, table: name, items })
            }
            Aspect::Keys => {
                let items = gateway.list_keys(table).await?;
                (items.len(), Action::KeysLoaded { epoch, table: name, items })
            }
            Aspect::Privileges => {
                let items = gateway.list_privileges(table).await?;
                (items.len(), Action::PrivilegesLoaded { epoch, table: name, items })
            }
            Aspect::Relationships(relationship_type) => {
                let items = gateway.list_relationships(table, relationship_type).await?;
                (
                    items.len(),
                    Action::RelationshipsLoaded {
                        epoch,
                        table: name,
                        relationship_type,
                        items,
                    },
                )
            }
            Aspect::Solutions => {
                let items = gateway.list_solutions_for_table(table).await?;
                (
                    items.len(),
                    Action::SolutionsForTableLoaded { epoch, table: name, items },
                )
            }
            Aspect::Tables => {
                let items = gateway.list_tables().await?;
                (items.len(), Action::TablesLoaded { epoch, tables: items })
            }
        })
    }

    fn current_scope(&self) -> TableScope {
        self.store.read(|vm| match vm.selected_solution() {
            Some(solution) => TableScope::Solution(solution.unique_name.clone()),
            None => TableScope::All,
        })
    }
}

/// The identity fields a gateway needs, without the table's loaded collections.
fn request_handle(table: &Table) -> Table {
    let mut handle = Table::new(table.logical_name.as_str(), table.display_name.as_str());
    handle.metadata_id = table.metadata_id.clone();
    handle
}

fn busy_outcome(busy: Busy) -> LoadOutcome {
    match busy {
        Busy::InFlight => LoadOutcome::InFlight,
        Busy::AlreadyLoaded => LoadOutcome::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::{LoadCoordinator, LoadKey, LoadOutcome, LoadState, TableScope};
    use crate::{
        host::Severity,
        model::{Aspect, Column, Connection, Key, Relationship, RelationshipType, Table},
        test_helpers::{RecordingHost, ScriptedGateway},
        view_model::{Action, ViewModelStore},
    };

    fn account() -> Table {
        let mut table = Table::new("account", "Account");
        table.metadata_id = "70816501-edb9-4740-a16c-6a5efbc05d84".into();
        table
    }

    fn coordinator(
        gateway: ScriptedGateway,
    ) -> (LoadCoordinator, ViewModelStore, Arc<ScriptedGateway>, Arc<RecordingHost>) {
        let store = ViewModelStore::new();
        let gateway = Arc::new(gateway);
        let host = Arc::new(RecordingHost::default());
        let coordinator = LoadCoordinator::new(
            store.clone(),
            gateway.clone(),
            host.clone(),
            Some(Connection::new("dev", "https://dev.crm.dynamics.com")),
        );
        (coordinator, store, gateway, host)
    }

    #[tokio::test]
    async fn keys_load_once() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account()])
            .with_keys("account", vec![Key::new("accountnumber_key")]);
        let (coordinator, store, gateway, host) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        assert_eq!(coordinator.load_keys("account").await, LoadOutcome::Loaded(1));
        assert_eq!(coordinator.load_keys("account").await, LoadOutcome::Skipped);

        assert_eq!(gateway.call_count("list_keys:account"), 1);
        assert_eq!(
            store.read(|vm| vm.table("account").map(|t| t.keys.len())),
            Some(1)
        );
        assert!(
            host.logs_with(Severity::Info)
                .contains(&"Loaded 1 keys for table: account".to_string())
        );
    }

    #[tokio::test]
    async fn failed_keys_load_is_retried_on_next_request() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account()])
            .failing("list_keys:account", "boom");
        let (coordinator, store, gateway, host) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        for _ in 0..2 {
            assert_eq!(
                coordinator.load_keys("account").await,
                LoadOutcome::Failed("boom".to_string())
            );
            assert_eq!(
                store.read(|vm| vm.table("account").map(|t| t.keys.len())),
                Some(0)
            );
        }

        assert_eq!(gateway.call_count("list_keys:account"), 2);
        let errors = host.logs_with(Severity::Error);
        assert_eq!(
            errors,
            vec!["Error loading keys for table account: boom".to_string(); 2]
        );
    }

    #[tokio::test]
    async fn empty_results_count_as_loaded() {
        let gateway = ScriptedGateway::default().with_tables(vec![account()]);
        let (coordinator, store, gateway, _) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        assert_eq!(
            coordinator.load_privileges("account").await,
            LoadOutcome::Loaded(0)
        );
        assert_eq!(
            coordinator.load_privileges("account").await,
            LoadOutcome::Skipped
        );
        assert_eq!(gateway.call_count("list_privileges:account"), 1);

        let key = LoadKey::new(store.epoch(), "account", Aspect::Privileges);
        assert_eq!(coordinator.state(&key), LoadState::Loaded { count: 0 });

        assert_eq!(
            coordinator.reload("account", Aspect::Privileges).await,
            LoadOutcome::Loaded(0)
        );
        assert_eq!(gateway.call_count("list_privileges:account"), 2);
    }

    #[tokio::test]
    async fn concurrent_duplicate_loads_share_one_request() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account()])
            .with_columns("account", vec![Column::new("name", "Name")])
            .with_delay(Duration::from_millis(20));
        let (coordinator, _, gateway, _) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        let (first, second) = tokio::join!(
            coordinator.load_columns("account"),
            coordinator.load_columns("account")
        );

        let mut outcomes = vec![first, second];
        outcomes.sort_by_key(|o| o == &LoadOutcome::InFlight);
        assert_eq!(outcomes, vec![LoadOutcome::Loaded(1), LoadOutcome::InFlight]);
        assert_eq!(gateway.call_count("list_columns:account"), 1);
    }

    #[tokio::test]
    async fn table_list_failure_is_logged_and_leaves_tables_empty() {
        let gateway = ScriptedGateway::default().failing("list_tables", "timeout");
        let (coordinator, store, _, host) = coordinator(gateway);

        let outcome = coordinator.load_tables(TableScope::All).await;

        assert_eq!(outcome, LoadOutcome::Failed("timeout".into()));
        assert_eq!(
            host.logs_with(Severity::Error),
            vec!["Error loading tables: timeout".to_string()]
        );
        assert!(store.read(|vm| vm.tables().is_empty()));

        let key = LoadKey::table_list(store.epoch());
        assert_eq!(
            coordinator.state(&key),
            LoadState::Failed {
                message: "timeout".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_connection_warns_without_calling_the_gateway() {
        let store = ViewModelStore::new();
        let gateway = Arc::new(ScriptedGateway::default());
        let host = Arc::new(RecordingHost::default());
        let coordinator =
            LoadCoordinator::new(store, gateway.clone(), host.clone(), None);

        assert_eq!(
            coordinator.load_tables(TableScope::All).await,
            LoadOutcome::NoConnection
        );
        assert_eq!(
            coordinator.load_columns("account").await,
            LoadOutcome::NoConnection
        );

        assert!(gateway.calls().is_empty());
        let notes = host.notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "No Connection");
        assert_eq!(notes[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn relationship_types_load_independently() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account()])
            .with_relationships(
                "account",
                RelationshipType::OneToMany,
                vec![Relationship::new("account_tasks", RelationshipType::OneToMany)],
            );
        let (coordinator, store, gateway, _) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        let outcomes = coordinator
            .ensure_table_loaded(
                "account",
                &RelationshipType::ALL.map(Aspect::Relationships),
            )
            .await;
        assert!(outcomes.iter().all(|(_, o)| matches!(o, LoadOutcome::Loaded(_))));

        let one_to_many = coordinator
            .load_relationships("account", RelationshipType::OneToMany)
            .await;
        assert_eq!(one_to_many, LoadOutcome::Skipped);
        assert_eq!(
            store.read(|vm| {
                vm.table("account")
                    .map(|t| t.relationship_count(RelationshipType::OneToMany))
            }),
            Some(1)
        );
        assert_eq!(
            gateway.call_count("list_relationships:account:ManyToManyRelationship"),
            1
        );
    }

    #[tokio::test]
    async fn results_for_a_reset_generation_are_dropped() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account()])
            .with_columns("account", vec![Column::new("name", "Name")])
            .with_delay(Duration::from_millis(20));
        let (coordinator, store, _, _) = coordinator(gateway);
        coordinator.load_tables(TableScope::All).await;

        let reset = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.dispatch(Action::SolutionSelected(None));
        };
        let (outcome, _) = tokio::join!(coordinator.load_columns("account"), reset);

        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(store.read(|vm| vm.tables().is_empty()));
    }

    #[tokio::test]
    async fn solution_scope_loads_only_its_tables() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![account(), Table::new("contact", "Contact")])
            .with_solution_tables("core", vec![account()]);
        let (coordinator, store, gateway, _) = coordinator(gateway);

        let outcome = coordinator
            .load_tables(TableScope::Solution("core".into()))
            .await;

        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(gateway.call_count("list_tables"), 0);
        assert_eq!(store.read(|vm| vm.tables().len()), 1);
    }
}
