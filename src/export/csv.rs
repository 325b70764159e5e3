//! Per-aspect CSV documents. Cells are comma-joined without quoting and rows
//! are separated by `\n`, which is what the host's spreadsheet import expects.

use crate::model::{RelationshipType, Table};

pub type Row = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub file_name: String,
    pub contents: String,
}

pub fn to_csv(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| row.join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn row<I, S>(cells: I) -> Row
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(Into::into).collect()
}

fn title(table: &Table) -> Row {
    row(["Table: ", table.display_name.as_str(), table.logical_name.as_str()])
}

fn document(table: &Table, suffix: &str, rows: Vec<Row>) -> CsvDocument {
    CsvDocument {
        file_name: format!("{}_{suffix}.csv", table.display_name),
        contents: to_csv(&rows),
    }
}

pub fn table_details(table: &Table) -> CsvDocument {
    let mut rows = vec![title(table), row(["Attribute Name", "Value"])];
    rows.extend(
        table
            .attributes
            .iter()
            .map(|attr| row([attr.name.as_str(), attr.value.as_str()])),
    );
    document(table, "metadata", rows)
}

/// Selected columns only, projected through `attributes`.
pub fn columns(table: &Table, attributes: &[&str]) -> CsvDocument {
    let mut header = row(["Column Name", "Logical Name", "Type"]);
    header.extend(attributes.iter().map(|name| name.to_string()));

    let mut rows = vec![title(table), header];
    rows.extend(table.selected_columns().into_iter().map(|column| {
        let mut cells = row([
            column.display_name.as_str(),
            column.logical_name.as_str(),
            column.data_type.as_str(),
        ]);
        cells.extend(column.attributes.project(attributes.iter().copied()));
        cells
    }));
    document(table, "columns_metadata", rows)
}

pub fn keys(table: &Table) -> CsvDocument {
    let mut header = row(["Key Name"]);
    if let Some(first) = table.keys.first() {
        header.extend(first.attributes.names().map(str::to_string));
    }

    let mut rows = vec![title(table), header];
    rows.extend(table.keys.iter().map(|key| {
        let mut cells = row([key.name.as_str()]);
        cells.extend(key.attributes.values().map(str::to_string));
        cells
    }));
    document(table, "keys_metadata", rows)
}

pub fn privileges(table: &Table) -> CsvDocument {
    let mut header = row(["Privilege Name"]);
    if let Some(first) = table.privileges.first() {
        header.extend(first.attributes.names().map(str::to_string));
    }

    let mut rows = vec![title(table), header];
    rows.extend(table.privileges.iter().map(|privilege| {
        let mut cells = row([privilege.name.as_str()]);
        cells.extend(privilege.attributes.values().map(str::to_string));
        cells
    }));
    document(table, "privileges_metadata", rows)
}

/// Selected relationships of one type only, projected through `attributes`.
pub fn relationships(
    table: &Table,
    relationship_type: RelationshipType,
    attributes: &[&str],
) -> CsvDocument {
    let mut heading = title(table);
    heading.extend(row(["Relationship Types: ", relationship_type.as_str()]));
    let mut header = row(["Relationship Name", "Type"]);
    header.extend(attributes.iter().map(|name| name.to_string()));

    let mut rows = vec![heading, header];
    rows.extend(
        table
            .selected_relationships(relationship_type)
            .into_iter()
            .map(|rel| {
                let mut cells = row([rel.schema_name.as_str(), rel.relationship_type.as_str()]);
                cells.extend(rel.attributes.project(attributes.iter().copied()));
                cells
            }),
    );
    document(
        table,
        &format!("{relationship_type}_metadata"),
        rows,
    )
}

pub fn solutions(table: &Table) -> CsvDocument {
    let mut rows = vec![
        title(table),
        row([
            "Solution Name",
            "Unique Name",
            "Version",
            "Is Managed",
            "Description",
            "Root Component Behavior",
        ]),
    ];
    rows.extend(table.solutions.iter().map(|solution| {
        row([
            solution.friendly_name.as_str(),
            solution.unique_name.as_str(),
            solution.version.as_str(),
            solution.managed_label(),
            solution.description.as_str(),
            solution.root_component_label(),
        ])
    }));
    document(table, "solutions_metadata", rows)
}
