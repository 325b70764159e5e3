use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, XlsxError};

use crate::{
    model::{Aspect, ExcelOptions, RelationshipType, Table},
    view_model::ViewModel,
};

use super::csv::Row;

const HEADER_FILL: u32 = 0x0078D4;
const STRIPE_FILL: u32 = 0xF3F4F6;
const HEADER_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPlan {
    pub name: String,
    pub rows: Vec<Row>,
}

impl SheetPlan {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }
}

/// Cell contents of one workbook, before any styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookPlan {
    pub file_name: String,
    pub sheets: Vec<SheetPlan>,
}

impl WorkbookPlan {
    pub fn sheet(&self, name: &str) -> Option<&SheetPlan> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Header,
    Stripe,
    Plain,
}

/// First row is the header; every even spreadsheet row after it is striped.
pub fn row_style(index: usize) -> RowStyle {
    match index {
        0 => RowStyle::Header,
        i if (i + 1) % 2 == 0 => RowStyle::Stripe,
        _ => RowStyle::Plain,
    }
}

/// Aspects a workbook needs loaded before it can be planned.
pub fn required_aspects(options: ExcelOptions) -> Vec<Aspect> {
    let mut aspects = Vec::new();
    if options.include_columns {
        aspects.push(Aspect::Columns);
    }
    if options.include_keys {
        aspects.push(Aspect::Keys);
    }
    if options.include_privileges {
        aspects.push(Aspect::Privileges);
    }
    if options.include_relationships {
        aspects.extend(RelationshipType::ALL.map(Aspect::Relationships));
    }
    if options.include_solutions {
        aspects.push(Aspect::Solutions);
    }
    aspects
}

fn cells<'a>(values: impl IntoIterator<Item = &'a str>) -> Row {
    values.into_iter().map(str::to_string).collect()
}

pub fn plan_workbook(table: &Table, vm: &ViewModel) -> WorkbookPlan {
    let options = vm.excel_options();
    let mut sheets = Vec::new();

    if options.include_table_details {
        let mut sheet = SheetPlan::new("Table Details");
        sheet.rows.push(cells(["Table Name", table.logical_name.as_str()]));
        sheet.rows.push(cells(["Display Name", table.display_name.as_str()]));
        sheet.rows.extend(
            table
                .attributes
                .iter()
                .map(|attr| cells([attr.name.as_str(), attr.value.as_str()])),
        );
        sheets.push(sheet);
    }

    if options.include_columns {
        let attributes = vm.column_attribute_names();
        let mut sheet = SheetPlan::new("Columns");
        let mut header = cells(["Column Name", "Display Name", "Data Type"]);
        header.extend(attributes.iter().map(|name| name.to_string()));
        sheet.rows.push(header);
        sheet.rows.extend(table.columns.iter().map(|column| {
            let mut row = cells([
                column.logical_name.as_str(),
                column.display_name.as_str(),
                column.data_type.as_str(),
            ]);
            row.extend(column.attributes.project(attributes.iter().copied()));
            row
        }));
        sheets.push(sheet);
    }

    if options.include_keys {
        let mut sheet = SheetPlan::new("Keys");
        if let Some(first) = table.keys.first() {
            let mut header = cells(["Key Name"]);
            header.extend(cells(first.attributes.names()));
            sheet.rows.push(header);
            sheet.rows.extend(table.keys.iter().map(|key| {
                let mut row = cells([key.name.as_str()]);
                row.extend(cells(key.attributes.values()));
                row
            }));
        }
        sheets.push(sheet);
    }

    if options.include_privileges {
        let mut sheet = SheetPlan::new("Privileges");
        if let Some(first) = table.privileges.first() {
            let mut header = cells(["Privilege Name"]);
            header.extend(cells(first.attributes.names()));
            sheet.rows.push(header);
            sheet.rows.extend(table.privileges.iter().map(|privilege| {
                let mut row = cells([privilege.name.as_str()]);
                row.extend(cells(privilege.attributes.values()));
                row
            }));
        }
        sheets.push(sheet);
    }

    if options.include_relationships {
        for relationship_type in RelationshipType::ALL {
            let attributes = vm.relationship_attributes(relationship_type);
            let mut sheet = SheetPlan::new(relationship_type.as_str());
            let mut of_type = table.relationships_of(relationship_type).peekable();
            if of_type.peek().is_some() {
                let mut header = cells(["Relationship Name"]);
                header.extend(attributes.iter().map(|name| name.to_string()));
                sheet.rows.push(header);
                sheet.rows.extend(of_type.map(|rel| {
                    let mut row = cells([rel.schema_name.as_str()]);
                    row.extend(rel.attributes.project(attributes.iter().copied()));
                    row
                }));
            }
            sheets.push(sheet);
        }
    }

    if options.include_solutions {
        let mut sheet = SheetPlan::new("Solutions");
        if !table.solutions.is_empty() {
            sheet.rows.push(cells([
                "Solution Name",
                "Unique Name",
                "Solution Id",
                "Description",
                "Version",
                "Is Managed",
                "Sub Components",
            ]));
            sheet.rows.extend(table.solutions.iter().map(|solution| {
                cells([
                    solution.friendly_name.as_str(),
                    solution.unique_name.as_str(),
                    solution.solution_id.as_str(),
                    solution.description.as_str(),
                    solution.version.as_str(),
                    solution.managed_label(),
                    solution.root_component_label(),
                ])
            }));
        }
        sheets.push(sheet);
    }

    WorkbookPlan {
        file_name: format!("{}.xlsx", table.display_name),
        sheets,
    }
}

/// Writes the plan as an `.xlsx` document.
pub fn render(plan: &WorkbookPlan) -> Result<Vec<u8>, XlsxError> {
    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);
    let stripe = Format::new()
        .set_background_color(Color::RGB(STRIPE_FILL))
        .set_pattern(FormatPattern::Solid);

    let mut workbook = Workbook::new();
    for sheet in &plan.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;

        for (index, values) in sheet.rows.iter().enumerate() {
            let row = u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)?;
            let format = match row_style(index) {
                RowStyle::Header => {
                    worksheet.set_row_height(row, HEADER_HEIGHT)?;
                    Some(&header)
                }
                RowStyle::Stripe => Some(&stripe),
                RowStyle::Plain => None,
            };
            if let Some(format) = format {
                worksheet.set_row_format(row, format)?;
            }

            for (col, value) in values.iter().enumerate() {
                let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
                match format {
                    Some(format) => {
                        worksheet.write_string_with_format(row, col, value.as_str(), format)?;
                    }
                    None => {
                        worksheet.write_string(row, col, value.as_str())?;
                    }
                }
            }
        }
    }
    workbook.save_to_buffer()
}
