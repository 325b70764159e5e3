use serde_json::{Map, Value};

use crate::model::{
    AttributeBag, Column, Key, Privilege, Relationship, RelationshipType, Solution, Table,
};

use super::{GatewayError, GatewayResult};

pub type RawRecord = Map<String, Value>;

/// Records of a `{ "value": [...] }` collection payload.
pub fn collection(payload: Value) -> GatewayResult<Vec<RawRecord>> {
    let Value::Object(mut body) = payload else {
        return Err(GatewayError::decode("expected a JSON object"));
    };
    let Some(Value::Array(items)) = body.remove("value") else {
        return Err(GatewayError::decode("missing `value` array"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(GatewayError::decode(format!(
                "expected record object, found {other}"
            ))),
        })
        .collect()
}

/// Single-entity payload; tolerates a collection wrapper by taking its first record.
pub fn single(payload: Value) -> GatewayResult<RawRecord> {
    match payload {
        Value::Object(mut body) => match body.remove("value") {
            Some(Value::Array(items)) => match items.into_iter().next() {
                Some(Value::Object(record)) => Ok(record),
                _ => Err(GatewayError::decode("empty `value` array")),
            },
            Some(other) => {
                body.insert("value".to_string(), other);
                Ok(body)
            }
            None => Ok(body),
        },
        _ => Err(GatewayError::decode("expected a JSON object")),
    }
}

fn text(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(value) => Some(value.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

const LOCALIZED_LABEL: &str = "/LocalizedLabels/0/Label";
const USER_LABEL: &str = "/UserLocalizedLabel/Label";

fn label_at(record: &RawRecord, pointers: [&str; 2]) -> Option<String> {
    let display = record.get("DisplayName")?;
    pointers
        .into_iter()
        .filter_map(|pointer| display.pointer(pointer).and_then(Value::as_str))
        .find(|label| !label.is_empty())
        .map(str::to_string)
}

/// First localized label, then the user's label. Tables and columns.
pub fn display_label(record: &RawRecord) -> Option<String> {
    label_at(record, [LOCALIZED_LABEL, USER_LABEL])
}

/// The user's label, then the first localized label. Keys.
pub fn user_display_label(record: &RawRecord) -> Option<String> {
    label_at(record, [USER_LABEL, LOCALIZED_LABEL])
}

pub fn table_from_record(record: &RawRecord) -> Table {
    let logical_name = text(record, "LogicalName").unwrap_or_default();
    table_with_name(record, logical_name)
}

pub fn table_with_name(record: &RawRecord, logical_name: String) -> Table {
    let display_name = display_label(record).unwrap_or_else(|| logical_name.clone());
    let mut table = Table::new(logical_name, display_name);
    table.metadata_id = text(record, "MetadataId").unwrap_or_default();
    table.attributes = AttributeBag::flatten(record);
    table
}

pub fn column_from_record(record: &RawRecord) -> Column {
    let logical_name = text(record, "LogicalName").unwrap_or_default();
    let display_name = display_label(record).unwrap_or_else(|| logical_name.clone());
    let mut column = Column::new(logical_name, display_name);
    column.data_type = text(record, "AttributeType").unwrap_or_default();
    column.attributes = AttributeBag::flatten(record);
    column
}

pub fn key_from_record(record: &RawRecord) -> Key {
    Key {
        name: user_display_label(record)
            .or_else(|| text(record, "LogicalName"))
            .unwrap_or_default(),
        attributes: AttributeBag::flatten(record),
    }
}

pub fn privilege_from_record(record: &RawRecord) -> Privilege {
    Privilege {
        name: text(record, "Name").unwrap_or_default(),
        attributes: AttributeBag::flatten(record),
    }
}

pub fn relationship_from_record(
    record: &RawRecord,
    relationship_type: RelationshipType,
) -> Relationship {
    let mut relationship = Relationship::new(
        text(record, "SchemaName").unwrap_or_default(),
        relationship_type,
    );
    relationship.attributes = AttributeBag::flatten(record);
    relationship
}

pub fn solution_from_record(record: &RawRecord) -> Solution {
    let mut solution = Solution::new(
        text(record, "solutionid").unwrap_or_default(),
        text(record, "friendlyname").unwrap_or_default(),
        text(record, "uniquename").unwrap_or_default(),
    );
    solution.description = text(record, "description").unwrap_or_default();
    solution.version = text(record, "version").unwrap_or_default();
    solution.is_managed = record
        .get("ismanaged")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    solution.root_component_behavior = record.get("sc.rootcomponentbehavior").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|raw| raw.parse().ok()))
    });
    solution
}
