use std::sync::{Arc, RwLock};

use crate::{
    coordinator::{LoadCoordinator, LoadOutcome, TableScope},
    export::Exporter,
    gateway::GatewayFactory,
    host::{HostBridge, Severity, SettingsStore},
    model::{Aspect, Connection, ConnectionEvent, Solution},
    view_model::{Action, Change, ViewModelStore},
};

use super::PreferenceService;

/// One browser session: the view-model plus the collaborators bound to the
/// current connection. A connection change swaps the gateway and coordinator
/// and resets the view-model.
pub struct Session {
    store: ViewModelStore,
    host: Arc<dyn HostBridge>,
    settings: Arc<dyn SettingsStore>,
    factory: Arc<dyn GatewayFactory>,
    coordinator: RwLock<Arc<LoadCoordinator>>,
}

impl Session {
    pub fn new(
        host: Arc<dyn HostBridge>,
        settings: Arc<dyn SettingsStore>,
        factory: Arc<dyn GatewayFactory>,
        connection: Option<Connection>,
    ) -> Self {
        let store = ViewModelStore::new();
        let coordinator = Self::bind(&store, &host, factory.as_ref(), connection);
        Self {
            store,
            host,
            settings,
            factory,
            coordinator: RwLock::new(coordinator),
        }
    }

    fn bind(
        store: &ViewModelStore,
        host: &Arc<dyn HostBridge>,
        factory: &dyn GatewayFactory,
        connection: Option<Connection>,
    ) -> Arc<LoadCoordinator> {
        let gateway = factory.build(connection.as_ref());
        Arc::new(LoadCoordinator::new(
            store.clone(),
            gateway,
            Arc::clone(host),
            connection,
        ))
    }

    pub fn store(&self) -> &ViewModelStore {
        &self.store
    }

    pub fn host(&self) -> &Arc<dyn HostBridge> {
        &self.host
    }

    pub fn coordinator(&self) -> Arc<LoadCoordinator> {
        Arc::clone(&self.coordinator.read().expect("coordinator lock poisoned"))
    }

    pub fn connection(&self) -> Option<Connection> {
        self.coordinator().connection().cloned()
    }

    pub fn preferences(&self) -> PreferenceService {
        PreferenceService::new(
            self.store.clone(),
            Arc::clone(&self.settings),
            Arc::clone(&self.host),
        )
    }

    pub fn exporter(&self) -> Exporter {
        Exporter::new(self.store.clone(), self.coordinator(), Arc::clone(&self.host))
    }

    /// Host connection lifecycle. `connection` is the host's active connection
    /// after the event; deletes leave the session disconnected.
    pub fn handle_connection_event(&self, event: ConnectionEvent, connection: Option<Connection>) {
        let connection = match event {
            ConnectionEvent::Deleted => None,
            ConnectionEvent::Created | ConnectionEvent::Updated => connection,
        };
        self.change_connection(connection);
    }

    pub fn change_connection(&self, connection: Option<Connection>) {
        match &connection {
            Some(conn) => self
                .host
                .log(&format!("Connected to {}", conn.name), Severity::Info),
            None => self.host.log("Disconnected", Severity::Info),
        }
        let coordinator = Self::bind(&self.store, &self.host, self.factory.as_ref(), connection);
        *self.coordinator.write().expect("coordinator lock poisoned") = coordinator;
        self.store.dispatch(Action::ConnectionChanged);
    }

    fn scope(&self) -> TableScope {
        self.store.read(|vm| match vm.selected_solution() {
            Some(solution) => TableScope::Solution(solution.unique_name.clone()),
            None => TableScope::All,
        })
    }

    /// Loads the table list for the current solution filter.
    pub async fn load_tables(&self) -> LoadOutcome {
        self.coordinator().load_tables(self.scope()).await
    }

    pub async fn reload_tables(&self) -> LoadOutcome {
        self.coordinator().reload_tables(self.scope()).await
    }

    pub async fn load_solutions(&self, managed: bool) -> LoadOutcome {
        self.coordinator().load_solutions(managed).await
    }

    /// Switches the solution filter and loads the matching tables.
    pub async fn select_solution(&self, solution: Option<Solution>) -> LoadOutcome {
        match &solution {
            Some(s) => self.host.log(
                &format!("Selected solution: {}", s.friendly_name),
                Severity::Info,
            ),
            None => self.host.log("Cleared solution filter", Severity::Info),
        }
        self.store.dispatch(Action::SolutionSelected(solution));
        self.load_tables().await
    }

    /// Opens a detail tab and loads its columns. Returns whether a tab was added.
    pub async fn open_table(&self, logical_name: &str) -> bool {
        match self.store.dispatch(Action::OpenTable(logical_name.to_string())) {
            Change::SelectedTables => {
                self.host.log(
                    &format!("Added \"{logical_name}\" to selected tables."),
                    Severity::Success,
                );
                self.coordinator().load_columns(logical_name).await;
                true
            }
            _ if self.store.read(|vm| vm.is_open(logical_name)) => {
                self.host.log(
                    &format!("\"{logical_name}\" is already in selected tables."),
                    Severity::Info,
                );
                false
            }
            _ => {
                self.host.log(
                    &format!("Table \"{logical_name}\" is not in the table list."),
                    Severity::Warning,
                );
                false
            }
        }
    }

    pub fn close_table(&self, logical_name: &str) -> bool {
        self.store
            .dispatch(Action::CloseTable(logical_name.to_string()))
            .is_change()
    }

    /// Switches a table's detail tab and loads what it shows.
    pub async fn show_detail(&self, logical_name: &str, aspect: Aspect) -> LoadOutcome {
        self.store.dispatch(Action::DetailTabChanged {
            table: logical_name.to_string(),
        });
        self.coordinator().load(logical_name, aspect).await
    }

    /// Loads every per-table aspect of every open table.
    pub async fn load_open_tables(&self) -> Vec<(String, Aspect, LoadOutcome)> {
        let coordinator = self.coordinator();
        let open = self.store.read(|vm| vm.selected_table_names().to_vec());
        let mut outcomes = Vec::new();
        for name in open {
            let loaded = coordinator
                .ensure_table_loaded(&name, &Aspect::TABLE_ASPECTS)
                .await;
            outcomes.extend(
                loaded
                    .into_iter()
                    .map(|(aspect, outcome)| (name.clone(), aspect, outcome)),
            );
        }
        outcomes
    }
}
