//! Stock ledger pane: the history dialog opened from an equipment stock or
//! client project row.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::catalog::{resolve_path, LedgerSpec};
use crate::error::ConsoleResult;
use crate::form::FormState;
use crate::grid::{self, GridModel};
use crate::options::ReferenceLists;
use crate::page::{keep_first, Modal, PageController, Pane, ToastLevel, UiEvent};

pub(crate) struct LedgerState {
    pub(crate) spec: &'static LedgerSpec,
    pub(crate) form: FormState,
    pub(crate) references: ReferenceLists,
    pub(crate) grid: Option<GridModel>,
}

impl LedgerState {
    fn new(spec: &'static LedgerSpec) -> Self {
        Self {
            spec,
            form: FormState::new(spec.fields),
            references: ReferenceLists::default(),
            grid: None,
        }
    }

    pub(crate) fn view(&self) -> LedgerView {
        LedgerView {
            title: self.spec.title,
            form: self.form.snapshot(),
            references: self.references.clone(),
            grid: self.grid.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub title: &'static str,
    pub form: Value,
    pub references: ReferenceLists,
    pub grid: Option<GridModel>,
}

impl PageController {
    fn ledger_spec(&self) -> ConsoleResult<&'static LedgerSpec> {
        self.module()
            .ledger
            .ok_or_else(|| self.reject("This page has no stock ledger."))
    }

    /// Opens the ledger of `parent_id`: a fresh form bound to the parent,
    /// its reference lists, its history and any header lookup.
    pub fn open_ledger(&self, parent_id: &str) -> ConsoleResult<()> {
        let spec = self.ledger_spec()?;
        let parent_id = parent_id.trim();
        if parent_id.is_empty() {
            return Err(self.reject("No record selected."));
        }
        self.session()?;
        self.cancel_pane(Pane::Ledger);
        {
            let mut ledger = LedgerState::new(spec);
            ledger.form.set(spec.parent, parent_id)?;
            self.lock().ledger = Some(ledger);
        }

        let mut outcome = self.load_references(Pane::Ledger);
        keep_first(&mut outcome, self.reload_ledger());
        for lookup in spec
            .lookups
            .iter()
            .filter(|lookup| lookup.trigger == spec.parent)
        {
            keep_first(&mut outcome, self.run_lookup(Pane::Ledger, lookup, 0));
        }
        outcome
    }

    pub fn reload_ledger(&self) -> ConsoleResult<()> {
        let spec = self.ledger_spec()?;
        let session = self.session()?;
        let path = {
            let state = self.lock();
            let form = state.form(Pane::Ledger)?;
            resolve_path(spec.list_path, |key| form.value(key))
        };
        let Some(path) = path else {
            return Err(self.reject("No record selected."));
        };
        let ticket = self.ticket(Pane::Ledger, "list");
        let result = self
            .client()
            .get(&session, &self.client().service_path(spec.service, &path));
        self.complete(ticket, result, |state, success| {
            if let Some(ledger) = state.ledger.as_mut() {
                ledger.grid = Some(grid::render(spec.title, spec.columns, &[], &success.content));
            }
        })
    }

    /// Posts a stock movement. On success the entry fields are cleared and
    /// the ledger reopened for the same parent.
    pub fn save_ledger_entry(&self) -> ConsoleResult<()> {
        let spec = self.ledger_spec()?;
        let session = self.session()?;
        let (payload, parent) = {
            let state = self.lock();
            let form = state.form(Pane::Ledger)?;
            (form.payload(), form.text(spec.parent).to_string())
        };
        let ticket = self.ticket(Pane::Ledger, "save");
        let path = self
            .client()
            .service_path(spec.service, &format!("{}/saveUpdate", spec.resource));
        let result = self.client().post(&session, &path, payload);
        self.complete(ticket, result, |state, success| {
            info!(ledger = spec.resource, parent = %parent, "stock entry saved");
            state.toast(ToastLevel::Success, success.message);
            if let Some(ledger) = state.ledger.as_mut() {
                ledger.form.clear_except(&[spec.parent]);
            }
        })?;
        self.open_ledger(&parent)
    }

    pub fn close_ledger(&self) {
        self.cancel_pane(Pane::Ledger);
        let mut state = self.lock();
        state.ledger = None;
        state.events.push(UiEvent::CloseModal {
            modal: Modal::Ledger,
        });
    }
}
