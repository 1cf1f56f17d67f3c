use serde::Serialize;
use serde_json::Value;

use crate::catalog::RowAction;
use crate::values::{is_empty_collection, js_like_value_string, row_string};

pub const EMPTY_TABLE_MESSAGE: &str = "No Data Found !!!";
pub const SEARCH_PLACEHOLDER: &str = "Search...";
pub const PAGE_SIZE: &str = "A4";

/// Table widget configuration for an empty collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoDataConfig {
    pub paginate: bool,
    pub length_change: bool,
    pub filter: bool,
    pub info: bool,
    pub destroy: bool,
    pub empty_table: &'static str,
    pub search_placeholder: &'static str,
}

impl Default for NoDataConfig {
    fn default() -> Self {
        Self {
            paginate: false,
            length_change: false,
            filter: false,
            info: false,
            destroy: true,
            empty_table: EMPTY_TABLE_MESSAGE,
            search_placeholder: SEARCH_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonKind {
    PageLength,
    Pdf,
    Excel,
    Print,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridButton {
    pub kind: ButtonKind,
    pub title: Option<String>,
    pub page_size: Option<&'static str>,
    /// Exported column indexes; never includes the action column.
    pub export_columns: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    pub data: String,
    pub actions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    pub action: RowAction,
    pub label: &'static str,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub id: String,
    pub cells: Vec<String>,
    pub actions: Vec<ActionButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub title: String,
    pub destroy: bool,
    pub search_placeholder: &'static str,
    pub buttons: Vec<GridButton>,
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
}

impl TableConfig {
    /// Data columns, i.e. everything but the trailing action column.
    pub fn data_columns(&self) -> impl Iterator<Item = (usize, &GridColumn)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.actions)
    }
}

/// A fully rebuilt grid; every render replaces the previous model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GridModel {
    NoData(NoDataConfig),
    Table(TableConfig),
}

impl GridModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, GridModel::NoData(_))
    }

    pub fn table(&self) -> Option<&TableConfig> {
        match self {
            GridModel::Table(table) => Some(table),
            GridModel::NoData(_) => None,
        }
    }
}

/// Renders `collection` into a grid bound to `columns`. A non-empty
/// `row_actions` appends the action column bound to each record's id.
pub fn render(title: &str, columns: &[&str], row_actions: &[RowAction], collection: &Value) -> GridModel {
    let records = match collection.as_array() {
        Some(records) if !is_empty_collection(collection) => records,
        _ => return GridModel::NoData(NoDataConfig::default()),
    };

    let mut grid_columns: Vec<GridColumn> = columns
        .iter()
        .map(|data| GridColumn {
            data: data.to_string(),
            actions: false,
        })
        .collect();
    if !row_actions.is_empty() {
        grid_columns.push(GridColumn {
            data: "id".to_string(),
            actions: true,
        });
    }

    let export_columns: Vec<usize> = (0..columns.len()).collect();
    let mut buttons = vec![GridButton {
        kind: ButtonKind::PageLength,
        title: None,
        page_size: None,
        export_columns: Vec::new(),
    }];
    for kind in [ButtonKind::Pdf, ButtonKind::Excel, ButtonKind::Print] {
        buttons.push(GridButton {
            kind,
            title: Some(title.to_string()),
            page_size: Some(PAGE_SIZE),
            export_columns: export_columns.clone(),
        });
    }

    let rows = records
        .iter()
        .map(|record| {
            let id = row_string(record, "id");
            GridRow {
                cells: columns
                    .iter()
                    .map(|column| js_like_value_string(record.get(*column)))
                    .collect(),
                actions: row_actions
                    .iter()
                    .map(|action| ActionButton {
                        action: *action,
                        label: action.label(),
                        target: id.clone(),
                    })
                    .collect(),
                id,
            }
        })
        .collect();

    GridModel::Table(TableConfig {
        title: title.to_string(),
        destroy: true,
        search_placeholder: SEARCH_PLACEHOLDER,
        buttons,
        columns: grid_columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ACTIONS: &[RowAction] = &[RowAction::Edit, RowAction::Delete];

    #[test]
    fn empty_collections_render_the_no_data_configuration() {
        for empty in [json!([]), json!(null), json!({})] {
            match render("Equipment Type Details", &["equipmentType"], ACTIONS, &empty) {
                GridModel::NoData(config) => {
                    assert!(!config.paginate && !config.length_change && !config.filter && !config.info);
                    assert_eq!(config.empty_table, "No Data Found !!!");
                    assert_eq!(config.search_placeholder, "Search...");
                }
                other => panic!("expected no-data grid, got {other:?}"),
            }
        }
    }

    #[test]
    fn rows_bind_columns_in_order_and_end_with_actions() {
        let grid = render(
            "Equipment Type Details",
            &["equipmentType", "status"],
            ACTIONS,
            &json!([{"id": 9, "equipmentType": "Drill", "status": "ACTIVE"}]),
        );
        let table = grid.table().expect("table");
        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[2].actions);
        assert_eq!(table.rows[0].cells, vec!["Drill", "ACTIVE"]);
        assert_eq!(table.rows[0].actions[1].action, RowAction::Delete);
        assert_eq!(table.rows[0].actions[1].target, "9");
    }

    #[test]
    fn export_buttons_skip_the_action_column() {
        let grid = render(
            "Client Details",
            &["fullName", "status"],
            ACTIONS,
            &json!([{"id": 1, "fullName": "A", "status": "ACTIVE"}]),
        );
        let table = grid.table().expect("table");
        let kinds: Vec<_> = table.buttons.iter().map(|button| button.kind).collect();
        assert_eq!(
            kinds,
            vec![ButtonKind::PageLength, ButtonKind::Pdf, ButtonKind::Excel, ButtonKind::Print]
        );
        for button in &table.buttons[1..] {
            assert_eq!(button.title.as_deref(), Some("Client Details"));
            assert_eq!(button.page_size, Some("A4"));
            assert_eq!(button.export_columns, vec![0, 1]);
        }
    }

    #[test]
    fn ledger_grids_have_no_action_column() {
        let grid = render(
            "Equipment Stock History Details",
            &["stockNumber", "date"],
            &[],
            &json!([{"stockNumber": "S-1", "date": "2024-01-02"}]),
        );
        let table = grid.table().expect("table");
        assert!(table.columns.iter().all(|column| !column.actions));
        assert!(table.rows[0].actions.is_empty());
    }
}
