use crate::grid::{GridModel, TableConfig};
use crate::values::clamp_string;

const DEFAULT_EXPORT_NAME: &str = "cims-export.csv";

pub fn sanitize_filename(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        DEFAULT_EXPORT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Safe `.csv` file name derived from a grid title or user input.
pub fn sanitize_export_filename(value: &str) -> String {
    let trimmed = clamp_string(value, 255, true);
    let safe = sanitize_filename(trimmed.as_str());
    if safe.to_lowercase().ends_with(".csv") {
        safe
    } else {
        format!("{safe}.csv")
    }
}

fn should_neutralize_csv(value: &str) -> bool {
    let trimmed = value.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('\'') {
        return false;
    }
    matches!(
        trimmed.chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@')
    )
}

fn neutralize_csv_formula(value: &str) -> String {
    if should_neutralize_csv(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn csv_escape(value: &str) -> String {
    let safe = neutralize_csv_formula(value);
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

fn table_to_csv(table: &TableConfig) -> String {
    let columns: Vec<usize> = table.data_columns().map(|(index, _)| index).collect();
    let mut lines: Vec<String> = Vec::new();
    lines.push(
        columns
            .iter()
            .map(|index| csv_escape(table.columns[*index].data.as_str()))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &table.rows {
        let line = columns
            .iter()
            .map(|index| csv_escape(row.cells.get(*index).map(String::as_str).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

/// Excel export of a grid: the data columns only, never the action column.
/// An empty grid exports nothing but the header of `columns`.
pub fn grid_to_csv(grid: &GridModel, columns: &[&str]) -> String {
    match grid {
        GridModel::Table(table) => table_to_csv(table),
        GridModel::NoData(_) => columns
            .iter()
            .map(|column| csv_escape(column))
            .collect::<Vec<_>>()
            .join(","),
    }
}
