use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::catalog::{FieldKind, FieldSpec};
use crate::error::{ConsoleError, ConsoleResult};
use crate::options::OptionList;
use crate::values::{nonempty_string, UNSET};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormMode {
    Create,
    Update,
}

impl FormMode {
    pub fn save_label(self) -> &'static str {
        match self {
            FormMode::Create => "Create",
            FormMode::Update => "Update",
        }
    }
}

/// Input values of one form, one entry per visible input.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    fields: &'static [FieldSpec],
    values: BTreeMap<String, FieldValue>,
}

fn cleared(kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Select | FieldKind::Choice(_) => FieldValue::Text(UNSET.to_string()),
        FieldKind::Checklist => FieldValue::Many(Vec::new()),
        _ => FieldValue::Text(String::new()),
    }
}

impl FormState {
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        let mut form = Self {
            fields,
            values: BTreeMap::new(),
        };
        form.clear_except(&[]);
        form
    }

    fn spec_of(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| match field.kind {
            FieldKind::Composite { parts, .. } => parts.contains(&key),
            _ => field.key == key,
        })
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Text value of an input; checklists and unknown keys read as `None`.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> &str {
        self.value(key).unwrap_or("")
    }

    pub fn checked(&self, key: &str) -> &[String] {
        match self.values.get(key) {
            Some(FieldValue::Many(values)) => values.as_slice(),
            _ => &[],
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> ConsoleResult<()> {
        match self.values.get_mut(key) {
            Some(FieldValue::Text(current)) => {
                *current = value.to_string();
                Ok(())
            }
            Some(FieldValue::Many(_)) => Err(ConsoleError::Input(format!(
                "'{key}' is a checkbox group"
            ))),
            None => Err(ConsoleError::Input(format!("unknown field '{key}'"))),
        }
    }

    pub fn toggle(&mut self, key: &str, value: &str, checked: bool) -> ConsoleResult<()> {
        let Some(FieldValue::Many(values)) = self.values.get_mut(key) else {
            return Err(ConsoleError::Input(format!("'{key}' is not a checkbox group")));
        };
        values.retain(|existing| existing != value);
        if checked {
            values.push(value.to_string());
        }
        Ok(())
    }

    /// Select-all / select-none over the options currently offered.
    pub fn check_all(&mut self, key: &str, options: &OptionList, checked: bool) -> ConsoleResult<()> {
        let Some(FieldValue::Many(values)) = self.values.get_mut(key) else {
            return Err(ConsoleError::Input(format!("'{key}' is not a checkbox group")));
        };
        *values = if checked { options.values() } else { Vec::new() };
        Ok(())
    }

    pub fn mode(&self) -> FormMode {
        if self.text("id").trim().is_empty() {
            FormMode::Create
        } else {
            FormMode::Update
        }
    }

    pub fn save_label(&self) -> &'static str {
        self.mode().save_label()
    }

    /// Save payload: every sent field, trimmed, composites joined and
    /// checklists as `[{"id": ..}]`.
    pub fn payload(&self) -> Value {
        let mut out = Map::new();
        for field in self.fields.iter().filter(|field| field.sent) {
            let value = match field.kind {
                FieldKind::Composite { parts, separator } => Value::String(
                    parts
                        .iter()
                        .map(|part| self.text(part).trim())
                        .collect::<Vec<_>>()
                        .join(separator),
                ),
                FieldKind::Checklist => Value::Array(
                    self.checked(field.key)
                        .iter()
                        .map(|id| json!({ "id": id.trim() }))
                        .collect(),
                ),
                _ => Value::String(self.text(field.key).trim().to_string()),
            };
            out.insert(field.key.to_string(), value);
        }
        Value::Object(out)
    }

    /// Replaces every input from `record`. Fields the record lacks go back to
    /// their cleared value, so applying the same record twice is a no-op.
    pub fn back_fill(&mut self, record: &Value) {
        for field in self.fields {
            match field.kind {
                FieldKind::Secret => {
                    self.values.insert(field.key.to_string(), cleared(field.kind));
                }
                FieldKind::Composite { parts, separator } => {
                    let joined = nonempty_string(record.get(field.key)).unwrap_or_default();
                    let mut pieces = joined.split(separator);
                    for part in parts {
                        let piece = pieces.next().unwrap_or("").to_string();
                        self.values.insert(part.to_string(), FieldValue::Text(piece));
                    }
                }
                FieldKind::Checklist => {
                    let ids = record
                        .get(field.key)
                        .and_then(Value::as_array)
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(|item| {
                                    nonempty_string(item.get("id")).or_else(|| nonempty_string(Some(item)))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    self.values.insert(field.key.to_string(), FieldValue::Many(ids));
                }
                _ => {
                    let value = nonempty_string(record.get(field.key))
                        .map(FieldValue::Text)
                        .unwrap_or_else(|| cleared(field.kind));
                    self.values.insert(field.key.to_string(), value);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.clear_except(&[]);
    }

    /// Resets every input except `keep`: text to empty, selects to `NONE`,
    /// checkboxes unchecked.
    pub fn clear_except(&mut self, keep: &[&str]) {
        for field in self.fields {
            let keys: Vec<&str> = match field.kind {
                FieldKind::Composite { parts, .. } => parts.to_vec(),
                _ => vec![field.key],
            };
            for key in keys {
                if keep.contains(&key) && self.values.contains_key(key) {
                    continue;
                }
                let value = match field.kind {
                    FieldKind::Composite { .. } => FieldValue::Text(String::new()),
                    kind => cleared(kind),
                };
                self.values.insert(key.to_string(), value);
            }
        }
    }

    /// Input key → cleared value, used when a parent select changes.
    pub fn reset(&mut self, key: &str) {
        if let Some(field) = self.spec_of(key) {
            let value = match field.kind {
                FieldKind::Composite { .. } => FieldValue::Text(String::new()),
                kind => cleared(kind),
            };
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn snapshot(&self) -> Value {
        serde_json::to_value(&self.values).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EMPLOYEE_PROFILE, EQUIPMENT_TYPE, FINANCIAL_YEAR, USER_ACCOUNT};

    #[test]
    fn new_form_is_in_create_mode_with_cleared_inputs() {
        let form = FormState::new(EQUIPMENT_TYPE.fields);
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.save_label(), "Create");
        assert_eq!(form.text("id"), "");
        assert_eq!(form.text("status"), "NONE");
    }

    #[test]
    fn payload_trims_every_value() {
        let mut form = FormState::new(EQUIPMENT_TYPE.fields);
        form.set("equipmentType", "  Drill ").expect("set");
        form.set("description", "Hand drill  ").expect("set");
        form.set("status", "ACTIVE").expect("set");
        assert_eq!(
            form.payload(),
            json!({"id": "", "equipmentType": "Drill", "description": "Hand drill", "status": "ACTIVE"})
        );
    }

    #[test]
    fn composite_fields_join_and_split() {
        let mut form = FormState::new(FINANCIAL_YEAR.fields);
        form.set("financialYearName", "2024").expect("set");
        form.set("termName", "2025").expect("set");
        assert_eq!(form.payload()["financialYear"], json!("2024-2025"));

        form.back_fill(&json!({"id": 4, "financialYear": "2023-2024", "status": "ACTIVE"}));
        assert_eq!(form.text("financialYearName"), "2023");
        assert_eq!(form.text("termName"), "2024");
        assert_eq!(form.mode(), FormMode::Update);
    }

    #[test]
    fn checklist_payload_wraps_ids() {
        let mut form = FormState::new(EMPLOYEE_PROFILE.fields);
        form.toggle("allowanceTypes", "2", true).expect("toggle");
        form.toggle("allowanceTypes", "5", true).expect("toggle");
        form.toggle("allowanceTypes", "2", false).expect("toggle");
        assert_eq!(form.payload()["allowanceTypes"], json!([{"id": "5"}]));

        form.back_fill(&json!({"id": 1, "allowanceTypes": [{"id": 3, "allowancePay": 100}, {"id": 9}]}));
        assert_eq!(form.checked("allowanceTypes"), ["3".to_string(), "9".to_string()]);
    }

    #[test]
    fn back_fill_is_idempotent_and_skips_secrets() {
        let record = json!({"id": 12, "userName": "alice", "password": "hash", "userRoleId": 2, "status": "ACTIVE"});
        let mut form = FormState::new(USER_ACCOUNT.fields);
        form.back_fill(&record);
        let once = form.clone();
        form.back_fill(&record);
        assert_eq!(form, once);
        assert_eq!(form.text("password"), "");
        assert_eq!(form.text("userRoleId"), "2");
    }

    #[test]
    fn clear_keeps_requested_inputs() {
        let mut form = FormState::new(EQUIPMENT_TYPE.fields);
        form.back_fill(&json!({"id": 3, "equipmentType": "Drill", "status": "ACTIVE"}));
        form.clear_except(&["equipmentType"]);
        assert_eq!(form.text("id"), "");
        assert_eq!(form.text("equipmentType"), "Drill");
        assert_eq!(form.text("status"), "NONE");
        assert!(form.set("unknown", "x").is_err());
    }
}
