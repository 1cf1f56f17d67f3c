use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::ReferenceSpec;
use crate::values::row_string;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Options of one dropdown or checkbox group, owned by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionList {
    options: Vec<SelectOption>,
}

impl OptionList {
    /// Builds the list from a reference response. Items without a value are
    /// skipped.
    pub fn from_items(spec: &ReferenceSpec, items: &Value) -> Self {
        let options = items
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let value = row_string(item, spec.value_field);
                        if value.is_empty() {
                            return None;
                        }
                        let label = spec
                            .label_fields
                            .iter()
                            .map(|field| row_string(item, field))
                            .collect::<Vec<_>>()
                            .join(" - ");
                        Some(SelectOption { value, label })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { options }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn values(&self) -> Vec<String> {
        self.options.iter().map(|option| option.value.clone()).collect()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Every reference list of a form, keyed by the field it feeds. Rendering a
/// list replaces the previous one outright, so reloading never piles up
/// duplicate options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceLists {
    lists: BTreeMap<String, OptionList>,
}

impl ReferenceLists {
    pub fn replace(&mut self, target: &str, list: OptionList) {
        self.lists.insert(target.to_string(), list);
    }

    pub fn clear(&mut self, target: &str) {
        self.lists.insert(target.to_string(), OptionList::default());
    }

    pub fn get(&self, target: &str) -> Option<&OptionList> {
        self.lists.get(target)
    }
}
