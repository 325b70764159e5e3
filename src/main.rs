use metadata_browser::{
    config::AppConfig,
    logging::init_tracing,
    services::{BrowsePlan, browse},
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("metadata browser failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().expect("failed to load config");
    init_tracing(&cfg.logging);

    let state = AppState::from_config(cfg);
    match state.session.connection() {
        Some(connection) => tracing::info!(
            "browsing {} ({})",
            connection.name,
            connection.environment_url
        ),
        None => tracing::warn!("no connection configured; set APP_CONNECTION__URL"),
    }

    let plan = BrowsePlan::from(&state.config.browse);
    let report = browse::run(&state.session, &plan).await?;

    for name in &report.missing {
        tracing::warn!("table {name} is not in the table list");
    }
    for failure in &report.failures {
        tracing::warn!("failed to load {failure}");
    }
    for path in &report.exported {
        tracing::info!("wrote {}", path.display());
    }
    tracing::info!(
        tables = report.tables_listed,
        opened = report.opened.len(),
        exported = report.exported.len(),
        notifications = state.host.notifications().len(),
        "browse finished"
    );
    Ok(())
}
