use serde_json::Value;

use crate::catalog::{AssignSource, LookupSpec};
use crate::form::FormState;
use crate::values::{format_number, nonempty_string, value_f64};

/// Resolves one assignment against a fetched record.
pub fn assigned_value(source: AssignSource, record: &Value) -> String {
    match source {
        AssignSource::Field(field) => nonempty_string(record.get(field)).unwrap_or_default(),
        AssignSource::Sum { list, field } => {
            let total: f64 = record
                .get(list)
                .and_then(Value::as_array)
                .map(|items| items.iter().map(|item| value_f64(item.get(field))).sum())
                .unwrap_or(0.0);
            format_number(total)
        }
    }
}

/// Writes the derived fields of `spec` into `form` and returns the keys that
/// changed, so dependent lookups can run next.
pub fn apply(spec: &LookupSpec, record: &Value, form: &mut FormState) -> Vec<&'static str> {
    let mut changed = Vec::new();
    for assignment in spec.assigns {
        let value = assigned_value(assignment.source, record);
        if form.value(assignment.target) != Some(value.as_str())
            && form.set(assignment.target, &value).is_ok()
        {
            changed.push(assignment.target);
        }
    }
    changed
}

/// Blanks the derived fields of `spec`, used when its trigger is unset.
pub fn reset(spec: &LookupSpec, form: &mut FormState) -> Vec<&'static str> {
    let mut changed = Vec::new();
    for assignment in spec.assigns {
        if !form.text(assignment.target).is_empty() && form.set(assignment.target, "").is_ok() {
            changed.push(assignment.target);
        }
    }
    changed
}
