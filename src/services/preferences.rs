use std::sync::Arc;

use crate::{
    host::{HostBridge, Severity, SettingsError, SettingsStore},
    model::{ColumnAttribute, ExcelOptions, Preferences, RelationshipAttribute, RelationshipType},
    view_model::{Action, ViewModelStore},
};

pub const TABLE_ATTRIBUTES_KEY: &str = "defaultTableColumns";
pub const COLUMN_ATTRIBUTES_KEY: &str = "defaultColumnAttributes";
pub const RELATIONSHIP_ATTRIBUTES_KEY_PREFIX: &str = "defaultRelationshipAttributes";
pub const EXCEL_OPTIONS_KEY: &str = "defaultExcelExportOptions";

pub fn relationship_attributes_key(relationship_type: RelationshipType) -> String {
    format!("{RELATIONSHIP_ATTRIBUTES_KEY_PREFIX}{relationship_type}")
}

/// Applies projection choices to the view-model and persists them as host defaults.
pub struct PreferenceService {
    store: ViewModelStore,
    settings: Arc<dyn SettingsStore>,
    host: Arc<dyn HostBridge>,
}

impl PreferenceService {
    pub fn new(
        store: ViewModelStore,
        settings: Arc<dyn SettingsStore>,
        host: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            store,
            settings,
            host,
        }
    }

    /// Reads every saved default. Unreadable or malformed values are logged and
    /// fall back to the built-in default for that entry only.
    pub async fn load_defaults(&self) -> Preferences {
        let mut preferences = Preferences::default();

        if let Some(raw) = self.read(TABLE_ATTRIBUTES_KEY).await {
            preferences.table_attributes = split_list(&raw);
        }
        if let Some(raw) = self.read(COLUMN_ATTRIBUTES_KEY).await {
            preferences.column_attributes = parse_column_attributes(&raw);
        }
        for relationship_type in RelationshipType::ALL {
            let key = relationship_attributes_key(relationship_type);
            let Some(raw) = self.read(&key).await else {
                continue;
            };
            match serde_json::from_str::<Vec<RelationshipAttribute>>(&raw) {
                Ok(saved) => preferences.relationship_attributes.extend(
                    saved
                        .into_iter()
                        .filter(|attr| attr.relationship_type == relationship_type),
                ),
                Err(err) => self.discard(&key, &err.to_string()),
            }
        }
        if let Some(raw) = self.read(EXCEL_OPTIONS_KEY).await {
            match serde_json::from_str::<ExcelOptions>(&raw) {
                Ok(options) => preferences.excel_options = options,
                Err(err) => self.discard(EXCEL_OPTIONS_KEY, &err.to_string()),
            }
        }

        self.store
            .dispatch(Action::DefaultsLoaded(preferences.clone()));
        preferences
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.settings.get(key).await {
            Ok(value) => value.filter(|raw| !raw.trim().is_empty()),
            Err(err) => {
                self.discard(key, &err.to_string());
                None
            }
        }
    }

    fn discard(&self, key: &str, reason: &str) {
        self.host.log(
            &format!("Ignoring saved setting {key}: {reason}"),
            Severity::Warning,
        );
    }

    pub fn apply_table_attributes(&self, names: Vec<String>) {
        self.store.dispatch(Action::TableAttributesApplied(names));
    }

    pub fn apply_column_attributes(&self, names: Vec<String>) {
        self.store.dispatch(Action::ColumnAttributesApplied(names));
    }

    pub fn apply_relationship_attributes(
        &self,
        relationship_type: RelationshipType,
        names: Vec<String>,
    ) {
        self.store.dispatch(Action::RelationshipAttributesApplied {
            relationship_type,
            names,
        });
    }

    pub fn apply_excel_options(&self, options: ExcelOptions) {
        self.store.dispatch(Action::ExcelOptionsChanged(options));
    }

    pub async fn save_table_attributes(&self, names: Vec<String>) -> Result<(), SettingsError> {
        self.apply_table_attributes(names);
        let value = self.store.read(|vm| vm.table_attributes().join(","));
        self.persist(TABLE_ATTRIBUTES_KEY, &value, "table columns")
            .await
    }

    pub async fn save_column_attributes(&self, names: Vec<String>) -> Result<(), SettingsError> {
        self.apply_column_attributes(names);
        let value = self.store.read(|vm| encode(vm.column_attributes()));
        self.persist(COLUMN_ATTRIBUTES_KEY, &value, "column attributes")
            .await
    }

    pub async fn save_relationship_attributes(
        &self,
        relationship_type: RelationshipType,
        names: Vec<String>,
    ) -> Result<(), SettingsError> {
        self.apply_relationship_attributes(relationship_type, names);
        let value = self.store.read(|vm| {
            let saved: Vec<RelationshipAttribute> = vm
                .relationship_attributes(relationship_type)
                .into_iter()
                .map(|name| RelationshipAttribute::new(name, relationship_type))
                .collect();
            encode(&saved)
        });
        self.persist(
            &relationship_attributes_key(relationship_type),
            &value,
            &format!("{relationship_type} attributes"),
        )
        .await
    }

    pub async fn save_excel_options(&self, options: ExcelOptions) -> Result<(), SettingsError> {
        self.apply_excel_options(options);
        self.persist(EXCEL_OPTIONS_KEY, &encode(&options), "Excel Export settings")
            .await
    }

    async fn persist(&self, key: &str, value: &str, subject: &str) -> Result<(), SettingsError> {
        match self.settings.set(key, value).await {
            Ok(()) => {
                self.host.notify(
                    "Default Saved",
                    &format!("Default {subject} have been saved."),
                    Severity::Success,
                );
                Ok(())
            }
            Err(err) => {
                self.host.notify(
                    "Save Failed",
                    &format!("Failed to save default {subject}. error: {err}"),
                    Severity::Error,
                );
                Err(err)
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON list of `{name, custom}`; older hosts stored a plain comma list.
fn parse_column_attributes(raw: &str) -> Vec<ColumnAttribute> {
    serde_json::from_str(raw)
        .unwrap_or_else(|_| split_list(raw).into_iter().map(ColumnAttribute::picked).collect())
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::error!("failed to encode setting: {err}");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        COLUMN_ATTRIBUTES_KEY, EXCEL_OPTIONS_KEY, PreferenceService, TABLE_ATTRIBUTES_KEY,
        relationship_attributes_key,
    };
    use crate::{
        host::{MemorySettings, Severity, SettingsStore},
        model::{ColumnAttribute, ExcelOptions, RelationshipType},
        test_helpers::RecordingHost,
        view_model::ViewModelStore,
    };

    fn service(
        settings: MemorySettings,
    ) -> (
        PreferenceService,
        ViewModelStore,
        Arc<MemorySettings>,
        Arc<RecordingHost>,
    ) {
        let store = ViewModelStore::new();
        let settings = Arc::new(settings);
        let host = Arc::new(RecordingHost::default());
        let service = PreferenceService::new(store.clone(), settings.clone(), host.clone());
        (service, store, settings, host)
    }

    #[tokio::test]
    async fn defaults_are_restored_from_settings() {
        let settings = MemorySettings::new()
            .with_value(TABLE_ATTRIBUTES_KEY, "ObjectTypeCode, IsCustomEntity")
            .with_value(
                COLUMN_ATTRIBUTES_KEY,
                r#"[{"name":"MaxLength","custom":false},{"name":"Mine","custom":true}]"#,
            )
            .with_value(
                &relationship_attributes_key(RelationshipType::ManyToMany),
                r#"[{"attributeName":"IntersectEntityName","type":"ManyToManyRelationship"}]"#,
            )
            .with_value(EXCEL_OPTIONS_KEY, r#"{"includeKeys":true}"#);
        let (service, store, _, host) = service(settings);

        service.load_defaults().await;

        store.read(|vm| {
            assert_eq!(vm.table_attributes(), ["ObjectTypeCode", "IsCustomEntity"]);
            assert_eq!(
                vm.column_attributes(),
                [ColumnAttribute::picked("MaxLength"), ColumnAttribute::custom("Mine")]
            );
            assert_eq!(
                vm.relationship_attributes(RelationshipType::ManyToMany),
                vec!["IntersectEntityName"]
            );
            assert!(vm.excel_options().include_keys);
        });
        assert!(host.logs().is_empty());
    }

    #[tokio::test]
    async fn legacy_and_malformed_values_fall_back() {
        let settings = MemorySettings::new()
            .with_value(COLUMN_ATTRIBUTES_KEY, "MaxLength, RequiredLevel")
            .with_value(EXCEL_OPTIONS_KEY, "not json");
        let (service, _, _, host) = service(settings);

        let preferences = service.load_defaults().await;

        assert_eq!(
            preferences.column_attributes,
            vec![
                ColumnAttribute::picked("MaxLength"),
                ColumnAttribute::picked("RequiredLevel")
            ]
        );
        assert_eq!(preferences.excel_options, ExcelOptions::default());
        assert_eq!(host.logs_with(Severity::Warning).len(), 1);
    }

    #[tokio::test]
    async fn saving_column_defaults_keeps_custom_entries() {
        let (service, store, settings, host) = service(MemorySettings::new());
        store.dispatch(crate::view_model::Action::CustomColumnAdded("Mine".into()));

        service
            .save_column_attributes(vec!["MaxLength".into()])
            .await
            .expect("saved");

        let saved = settings
            .get(COLUMN_ATTRIBUTES_KEY)
            .await
            .expect("read back")
            .expect("value present");
        assert_eq!(
            saved,
            r#"[{"name":"MaxLength","custom":false},{"name":"Mine","custom":true}]"#
        );
        let note = &host.notifications()[0];
        assert_eq!(note.title, "Default Saved");
        assert_eq!(note.body, "Default column attributes have been saved.");
    }

    #[tokio::test]
    async fn relationship_defaults_are_saved_per_type() {
        let (service, _, settings, _) = service(MemorySettings::new());

        service
            .save_relationship_attributes(
                RelationshipType::OneToMany,
                vec!["ReferencingEntity".into()],
            )
            .await
            .expect("saved");

        let key = relationship_attributes_key(RelationshipType::OneToMany);
        assert_eq!(key, "defaultRelationshipAttributesOneToManyRelationship");
        let saved = settings.get(&key).await.expect("read").expect("present");
        assert_eq!(
            saved,
            r#"[{"attributeName":"ReferencingEntity","type":"OneToManyRelationship"}]"#
        );
    }
}
