use std::path::PathBuf;

use crate::{
    config::BrowseConfig,
    coordinator::LoadOutcome,
    error::BrowserError,
    host::Severity,
    model::{Aspect, Solution},
};

use super::Session;

/// A scripted browse: optional solution filter, tables to open, optional export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowsePlan {
    pub solution: Option<String>,
    pub managed_solutions: bool,
    pub tables: Vec<String>,
    pub export_excel: bool,
}

impl From<&BrowseConfig> for BrowsePlan {
    fn from(cfg: &BrowseConfig) -> Self {
        Self {
            solution: cfg.solution.clone(),
            managed_solutions: cfg.managed_solutions,
            tables: cfg.table_names(),
            export_excel: cfg.export_excel,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowseReport {
    pub tables_listed: usize,
    pub opened: Vec<String>,
    pub missing: Vec<String>,
    /// One line per aspect that failed to load.
    pub failures: Vec<String>,
    pub exported: Vec<PathBuf>,
}

pub async fn run(session: &Session, plan: &BrowsePlan) -> Result<BrowseReport, BrowserError> {
    if !session.connection().is_some_and(|c| c.is_active) {
        return Err(BrowserError::NoConnection);
    }

    session.preferences().load_defaults().await;
    session.load_solutions(plan.managed_solutions).await;

    let outcome = match plan.solution.as_deref() {
        Some(unique_name) => {
            let solution = session
                .store()
                .read(|vm| {
                    vm.solutions()
                        .iter()
                        .find(|s| s.unique_name == unique_name)
                        .cloned()
                })
                .unwrap_or_else(|| Solution::new("", unique_name, unique_name));
            session.select_solution(Some(solution)).await
        }
        None => session.load_tables().await,
    };
    match outcome {
        LoadOutcome::Failed(message) => return Err(BrowserError::load(Aspect::Tables, message)),
        LoadOutcome::NoConnection => return Err(BrowserError::NoConnection),
        _ => {}
    }

    let mut report = BrowseReport {
        tables_listed: session.store().read(|vm| vm.tables().len()),
        ..BrowseReport::default()
    };

    for name in &plan.tables {
        session.open_table(name).await;
        if session.store().read(|vm| vm.is_open(name)) {
            report.opened.push(name.clone());
        } else {
            report.missing.push(name.clone());
        }
    }

    for (table, aspect, outcome) in session.load_open_tables().await {
        if let LoadOutcome::Failed(message) = outcome {
            report
                .failures
                .push(format!("{aspect} for table {table}: {message}"));
        }
    }

    if plan.export_excel {
        report.exported = session.exporter().export_selected().await?;
    }

    session.host().log(
        &format!(
            "Browse finished: {} tables listed, {} opened",
            report.tables_listed,
            report.opened.len()
        ),
        Severity::Info,
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{BrowsePlan, run};
    use crate::{
        error::BrowserError,
        host::MemorySettings,
        model::{Connection, Key, Solution, Table},
        services::Session,
        test_helpers::{RecordingHost, ScriptedGateway, ScriptedGatewayFactory},
    };

    fn session(
        gateway: ScriptedGateway,
        connection: Option<Connection>,
    ) -> (Session, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let session = Session::new(
            host.clone(),
            Arc::new(MemorySettings::new()),
            Arc::new(ScriptedGatewayFactory::new(Arc::new(gateway))),
            connection,
        );
        (session, host)
    }

    fn dev() -> Option<Connection> {
        Some(Connection::new("dev", "https://dev.crm.dynamics.com"))
    }

    #[tokio::test]
    async fn plan_opens_tables_and_collects_failures() {
        let gateway = ScriptedGateway::default()
            .with_tables(vec![Table::new("account", "Account")])
            .with_keys("account", vec![Key::new("Account Number")])
            .failing("list_privileges:account", "forbidden");
        let (session, host) = session(gateway, dev());
        let plan = BrowsePlan {
            tables: vec!["account".into(), "ghost".into()],
            export_excel: true,
            ..BrowsePlan::default()
        };

        let report = run(&session, &plan).await.expect("browse runs");

        assert_eq!(report.tables_listed, 1);
        assert_eq!(report.opened, vec!["account"]);
        assert_eq!(report.missing, vec!["ghost"]);
        assert_eq!(report.failures, vec!["privileges for table account: forbidden"]);
        assert_eq!(report.exported.len(), 1);
        assert!(host.saved("Account.xlsx").is_some());
    }

    #[tokio::test]
    async fn solution_filter_is_resolved_from_the_picker() {
        let mut core = Solution::new("id-1", "Core", "core");
        core.is_managed = true;
        let gateway = ScriptedGateway::default()
            .with_solutions(vec![core])
            .with_solution_tables("core", vec![Table::new("contact", "Contact")]);
        let (session, _) = session(gateway, dev());
        let plan = BrowsePlan {
            solution: Some("core".into()),
            managed_solutions: true,
            ..BrowsePlan::default()
        };

        let report = run(&session, &plan).await.expect("browse runs");

        assert_eq!(report.tables_listed, 1);
        assert_eq!(
            session
                .store()
                .read(|vm| vm.selected_solution().map(|s| s.solution_id.clone())),
            Some("id-1".to_string())
        );
    }

    #[tokio::test]
    async fn table_list_failure_aborts_the_plan() {
        let gateway = ScriptedGateway::default().failing("list_tables", "timeout");
        let (session, _) = session(gateway, dev());

        let err = run(&session, &BrowsePlan::default())
            .await
            .expect_err("tables fail");
        assert_eq!(err.to_string(), "Error loading tables: timeout");

        let (disconnected, _) = session_without_connection();
        let err = run(&disconnected, &BrowsePlan::default())
            .await
            .expect_err("no connection");
        assert!(matches!(err, BrowserError::NoConnection));
    }

    fn session_without_connection() -> (Session, Arc<RecordingHost>) {
        session(ScriptedGateway::default(), None)
    }
}
