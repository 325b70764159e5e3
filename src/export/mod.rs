//! CSV and Excel exports of table metadata.
//!
//! Document building is pure (`csv`, `excel::plan_workbook`); `Exporter` adds the
//! lazy loading and hands finished bytes to the host's file sink.

pub mod csv;
pub mod excel;

use std::{path::PathBuf, sync::Arc};

use crate::{
    coordinator::LoadCoordinator,
    host::{HostBridge, HostError, Severity},
    model::RelationshipType,
    view_model::ViewModelStore,
};

pub use self::csv::{CsvDocument, to_csv};
pub use excel::{SheetPlan, WorkbookPlan, plan_workbook};

const NO_TABLES_MESSAGE: &str = "No tables selected for export.";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("table {0} is not loaded")]
    UnknownTable(String),
    #[error("failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Which grid of the detail view to export as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvExport {
    Details,
    Columns,
    Keys,
    Privileges,
    Relationships(RelationshipType),
    Solutions,
}

pub struct Exporter {
    store: ViewModelStore,
    coordinator: Arc<LoadCoordinator>,
    host: Arc<dyn HostBridge>,
}

impl Exporter {
    pub fn new(
        store: ViewModelStore,
        coordinator: Arc<LoadCoordinator>,
        host: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            store,
            coordinator,
            host,
        }
    }

    /// Builds the CSV for what the grid currently holds; nothing is fetched.
    pub fn csv_document(&self, table: &str, kind: CsvExport) -> Result<CsvDocument, ExportError> {
        self.store.read(|vm| {
            let target = vm
                .table(table)
                .ok_or_else(|| ExportError::UnknownTable(table.to_string()))?;
            Ok(match kind {
                CsvExport::Details => csv::table_details(target),
                CsvExport::Columns => csv::columns(target, &vm.column_attribute_names()),
                CsvExport::Keys => csv::keys(target),
                CsvExport::Privileges => csv::privileges(target),
                CsvExport::Relationships(ty) => {
                    csv::relationships(target, ty, &vm.relationship_attributes(ty))
                }
                CsvExport::Solutions => csv::solutions(target),
            })
        })
    }

    pub async fn export_csv(&self, table: &str, kind: CsvExport) -> Result<PathBuf, ExportError> {
        let document = self.csv_document(table, kind)?;
        let path = self
            .host
            .save_file(&document.file_name, document.contents.as_bytes())
            .await?;
        self.host
            .log(&format!("Exported {}", document.file_name), Severity::Success);
        Ok(path)
    }

    /// One workbook per open table, in tab order.
    pub async fn export_selected(&self) -> Result<Vec<PathBuf>, ExportError> {
        let tables = self.store.read(|vm| vm.selected_table_names().to_vec());
        self.export_excel(&tables).await
    }

    pub async fn export_excel(&self, tables: &[String]) -> Result<Vec<PathBuf>, ExportError> {
        if tables.is_empty() {
            self.host.log(NO_TABLES_MESSAGE, Severity::Warning);
            self.host
                .notify("Metadata Browser", NO_TABLES_MESSAGE, Severity::Info);
            return Ok(Vec::new());
        }

        let aspects = excel::required_aspects(self.store.read(|vm| vm.excel_options()));
        let connected = self.coordinator.connection().is_some_and(|c| c.is_active);
        if !connected && !aspects.is_empty() {
            self.host.log(
                "Not connected; exporting metadata already loaded.",
                Severity::Warning,
            );
        }

        let mut saved = Vec::with_capacity(tables.len());
        for name in tables {
            if connected {
                self.coordinator.ensure_table_loaded(name, &aspects).await;
            }
            match self.export_workbook(name).await {
                Ok(path) => saved.push(path),
                Err(err) => {
                    self.host.notify(
                        "Export Failed",
                        &format!("Failed to export {name}: {err}"),
                        Severity::Error,
                    );
                    return Err(err);
                }
            }
        }
        Ok(saved)
    }

    async fn export_workbook(&self, name: &str) -> Result<PathBuf, ExportError> {
        let plan = self.store.read(|vm| {
            vm.table(name)
                .map(|table| plan_workbook(table, vm))
                .ok_or_else(|| ExportError::UnknownTable(name.to_string()))
        })?;
        self.host
            .log(&format!("Exporting table: {name}"), Severity::Info);

        let bytes = excel::render(&plan)?;
        let path = self.host.save_file(&plan.file_name, &bytes).await?;
        self.host
            .log(&format!("Exported {}", plan.file_name), Severity::Success);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CsvExport, ExportError, Exporter};
    use crate::{
        coordinator::{LoadCoordinator, TableScope},
        host::Severity,
        model::{Column, Connection, ExcelOptions, Key, Table},
        test_helpers::{RecordingHost, ScriptedGateway},
        view_model::{Action, ViewModelStore},
    };

    async fn exporter(
        gateway: ScriptedGateway,
        connection: Option<Connection>,
    ) -> (Exporter, ViewModelStore, Arc<ScriptedGateway>, Arc<RecordingHost>) {
        let store = ViewModelStore::new();
        let gateway = Arc::new(gateway);
        let host = Arc::new(RecordingHost::default());
        let coordinator = Arc::new(LoadCoordinator::new(
            store.clone(),
            gateway.clone(),
            host.clone(),
            connection,
        ));
        coordinator.load_tables(TableScope::All).await;
        (
            Exporter::new(store.clone(), coordinator, host.clone()),
            store,
            gateway,
            host,
        )
    }

    fn connection() -> Option<Connection> {
        Some(Connection::new("dev", "https://dev.crm.dynamics.com"))
    }

    #[tokio::test]
    async fn excel_export_loads_missing_aspects_first() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![Table::new("account", "Account")])
            .with_columns("account", vec![Column::new("name", "Name")])
            .with_keys("account", vec![Key::new("Account Number")]);
        let (exporter, store, gateway, host) = exporter(gateway, connection()).await;
        store.dispatch(Action::OpenTable("account".into()));
        store.dispatch(Action::ExcelOptionsChanged(ExcelOptions {
            include_keys: true,
            ..ExcelOptions::default()
        }));

        let saved = exporter.export_selected().await.expect("export succeeds");

        assert_eq!(saved.len(), 1);
        assert_eq!(gateway.call_count("list_columns:account"), 1);
        assert_eq!(gateway.call_count("list_keys:account"), 1);
        assert_eq!(gateway.call_count("list_privileges:account"), 0);
        let bytes = host.saved("Account.xlsx").expect("workbook saved");
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn excel_export_without_tables_only_warns() {
        let (exporter, _, _, host) = exporter(ScriptedGateway::default(), connection()).await;

        let saved = exporter.export_selected().await.expect("nothing to do");

        assert!(saved.is_empty());
        assert_eq!(
            host.logs_with(Severity::Warning),
            vec!["No tables selected for export.".to_string()]
        );
        assert_eq!(host.notifications()[0].severity, Severity::Info);
        assert!(host.saved_files().is_empty());
    }

    #[tokio::test]
    async fn csv_export_saves_through_the_host() {
        let mut table = Table::new("account", "Account");
        table.attributes.push("ObjectTypeCode", "1");
        let gateway = ScriptedGateway::default().with_tables(vec![table]);
        let (exporter, _, _, host) = exporter(gateway, connection()).await;

        exporter
            .export_csv("account", CsvExport::Details)
            .await
            .expect("csv saved");

        assert_eq!(
            host.saved_text("Account_metadata.csv").as_deref(),
            Some("Table: ,Account,account\nAttribute Name,Value\nObjectTypeCode,1")
        );
        let err = exporter
            .export_csv("contact", CsvExport::Keys)
            .await
            .expect_err("unknown table");
        assert!(matches!(err, ExportError::UnknownTable(_)));
    }
}
