use std::{collections::BTreeSet, sync::Arc};

use metadata_browser::{
    export::CsvExport,
    host::{HostBridge, JsonFileSettings, LocalHost, Severity, SettingsStore},
    model::{
        Column, Connection, ExcelOptions, Privilege, Relationship, RelationshipType,
        RowSelectionTarget, Solution, Table,
    },
    services::{Session, preferences::EXCEL_OPTIONS_KEY},
    test_helpers::{ScriptedGateway, ScriptedGatewayFactory},
    view_model::Action,
};

fn account() -> Table {
    let mut table = Table::new("account", "Account");
    table.metadata_id = "70816501-edb9-4740-a16c-6a5efbc05d84".into();
    table.attributes.push("LogicalName", "account");
    table.attributes.push("ObjectTypeCode", "1");
    table
}

fn gateway() -> ScriptedGateway {
    let mut name = Column::new("name", "Account Name");
    name.data_type = "String".into();
    name.attributes.push("MaxLength", "160");
    let mut revenue = Column::new("revenue", "Revenue");
    revenue.data_type = "Money".into();

    let mut read = Privilege::new("prvReadAccount");
    read.attributes.push("PrivilegeType", "Read");

    let mut core = Solution::new("fd140aaf-4df4-11dd-bd17-0019b9312238", "Core", "core");
    core.root_component_behavior = Some(0);

    ScriptedGateway::default()
        .with_tables(vec![account()])
        .with_columns("account", vec![name, revenue])
        .with_privileges("account", vec![read])
        .with_relationships(
            "account",
            RelationshipType::ManyToOne,
            vec![Relationship::new(
                "account_primary_contact",
                RelationshipType::ManyToOne,
            )],
        )
        .with_table_solutions("account", vec![core])
}

struct Fixture {
    _dir: tempfile::TempDir,
    host: Arc<LocalHost>,
    settings: Arc<JsonFileSettings>,
    gateway: Arc<ScriptedGateway>,
    session: Session,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let host = Arc::new(LocalHost::new(dir.path().join("out")));
    let settings = Arc::new(JsonFileSettings::new(dir.path().join("settings.json")));
    let gateway = Arc::new(gateway());
    let bridge: Arc<dyn HostBridge> = host.clone();
    let session = Session::new(
        bridge,
        settings.clone(),
        Arc::new(ScriptedGatewayFactory::new(Arc::clone(&gateway))),
        Some(Connection::new("dev", "https://dev.crm.dynamics.com")),
    );
    Fixture {
        _dir: dir,
        host,
        settings,
        gateway,
        session,
    }
}

#[tokio::test]
async fn column_csv_contains_only_selected_rows() {
    let fx = fixture();
    fx.session.load_tables().await;
    fx.session.open_table("account").await;
    fx.session
        .preferences()
        .apply_column_attributes(vec!["MaxLength".into()]);
    fx.session.store().dispatch(Action::SetRowSelection {
        table: "account".into(),
        target: RowSelectionTarget::Columns,
        ids: BTreeSet::from(["name".to_string()]),
    });

    let path = fx
        .session
        .exporter()
        .export_csv("account", CsvExport::Columns)
        .await
        .expect("csv written");

    assert_eq!(path, fx.host.output_dir().join("Account_columns_metadata.csv"));
    let written = std::fs::read_to_string(&path).expect("read csv");
    assert_eq!(
        written,
        "Table: ,Account,account\nColumn Name,Logical Name,Type,MaxLength\nAccount Name,name,String,160"
    );
}

#[tokio::test]
async fn workbook_export_fetches_every_enabled_aspect() {
    let fx = fixture();
    fx.session.load_tables().await;
    fx.session.open_table("account").await;
    fx.session
        .preferences()
        .apply_excel_options(ExcelOptions::everything());

    let written = fx
        .session
        .exporter()
        .export_selected()
        .await
        .expect("workbook written");

    assert_eq!(written, vec![fx.host.output_dir().join("Account.xlsx")]);
    let bytes = std::fs::read(&written[0]).expect("read workbook");
    assert!(bytes.starts_with(b"PK"));
    for call in [
        "list_privileges:account",
        "list_keys:account",
        "list_relationships:account:OneToManyRelationship",
        "list_relationships:account:ManyToOneRelationship",
        "list_relationships:account:ManyToManyRelationship",
        "list_solutions_for_table:account",
    ] {
        assert_eq!(fx.gateway.call_count(call), 1, "{call}");
    }
    assert_eq!(fx.gateway.call_count("list_columns:account"), 1);

    fx.session.store().read(|vm| {
        let account = vm.table("account").expect("account");
        assert_eq!(account.privileges.len(), 1);
        assert_eq!(account.solutions[0].root_component_label(), "Include Subcomponents");
    });
    assert!(
        fx.host
            .events()
            .iter()
            .any(|e| e.severity == Severity::Success && e.message == "Exported Account.xlsx")
    );
}

#[tokio::test]
async fn saved_export_defaults_survive_a_new_session() {
    let fx = fixture();
    let options = ExcelOptions {
        include_solutions: true,
        ..ExcelOptions::default()
    };

    fx.session
        .preferences()
        .save_excel_options(options)
        .await
        .expect("defaults saved");

    let raw = fx
        .settings
        .get(EXCEL_OPTIONS_KEY)
        .await
        .expect("settings readable")
        .expect("value stored");
    assert!(raw.contains("\"includeSolutions\":true"));

    let reopened = Session::new(
        fx.host.clone(),
        Arc::new(JsonFileSettings::new(fx._dir.path().join("settings.json"))),
        Arc::new(ScriptedGatewayFactory::new(Arc::clone(&fx.gateway))),
        None,
    );
    let restored = reopened.preferences().load_defaults().await;
    assert_eq!(restored.excel_options, options);
    assert_eq!(fx.host.notifications()[0].title, "Default Saved");
}
