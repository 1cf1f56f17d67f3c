use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::catalog::{
    resolve_path, FieldKind, FileType, LookupSpec, ModuleSpec, ReferenceSpec, RowAction, Service,
};
use crate::client::ApiClient;
use crate::error::{ConsoleError, ConsoleResult};
use crate::export::{grid_to_csv, sanitize_export_filename};
use crate::form::{FormMode, FormState};
use crate::grid::{self, GridModel};
use crate::inflight::{InFlight, RequestTicket};
use crate::ledger::{LedgerState, LedgerView};
use crate::lookup;
use crate::options::{OptionList, ReferenceLists};
use crate::preview::{self, PdfBlob, Preview, PreviewKind, StagedFile};
use crate::session::{Guard, Navigation, SessionContext, SessionStore};
use crate::values::row_string;

/// Lookups chain through assigned fields; the catalog never nests deeper.
const MAX_LOOKUP_DEPTH: usize = 4;

/// Which form of the page an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pane {
    Record,
    Ledger,
}

impl Pane {
    fn tag(self) -> &'static str {
        match self {
            Pane::Record => "record",
            Pane::Ledger => "ledger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Modal {
    Delete,
    Ledger,
    PaySlip,
}

/// Side effect for the view to perform, drained with [`PageController::view`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    Toast { level: ToastLevel, message: String },
    Navigate { path: String },
    CloseModal { modal: Modal },
}

pub(crate) struct PageState {
    pub(crate) session: Option<SessionContext>,
    pub(crate) closed: bool,
    pub(crate) form: FormState,
    pub(crate) references: ReferenceLists,
    pub(crate) grid: Option<GridModel>,
    pub(crate) pending_delete: Option<String>,
    pub(crate) staged_file: Option<StagedFile>,
    pub(crate) preview: Preview,
    pub(crate) pay_slip: Option<Preview>,
    pub(crate) document: Option<PdfBlob>,
    pub(crate) ledger: Option<LedgerState>,
    pub(crate) events: Vec<UiEvent>,
}

fn ledger_closed() -> ConsoleError {
    ConsoleError::Input("The stock ledger is not open.".to_string())
}

impl PageState {
    pub(crate) fn form(&self, pane: Pane) -> ConsoleResult<&FormState> {
        match pane {
            Pane::Record => Ok(&self.form),
            Pane::Ledger => self
                .ledger
                .as_ref()
                .map(|ledger| &ledger.form)
                .ok_or_else(ledger_closed),
        }
    }

    pub(crate) fn form_mut(&mut self, pane: Pane) -> ConsoleResult<&mut FormState> {
        match pane {
            Pane::Record => Ok(&mut self.form),
            Pane::Ledger => self
                .ledger
                .as_mut()
                .map(|ledger| &mut ledger.form)
                .ok_or_else(ledger_closed),
        }
    }

    fn lists(&self, pane: Pane) -> ConsoleResult<&ReferenceLists> {
        match pane {
            Pane::Record => Ok(&self.references),
            Pane::Ledger => self
                .ledger
                .as_ref()
                .map(|ledger| &ledger.references)
                .ok_or_else(ledger_closed),
        }
    }

    fn lists_mut(&mut self, pane: Pane) -> ConsoleResult<&mut ReferenceLists> {
        match pane {
            Pane::Record => Ok(&mut self.references),
            Pane::Ledger => self
                .ledger
                .as_mut()
                .map(|ledger| &mut ledger.references)
                .ok_or_else(ledger_closed),
        }
    }

    pub(crate) fn toast(&mut self, level: ToastLevel, message: String) {
        self.events.push(UiEvent::Toast { level, message });
    }

    /// Queues the error toast for `err` (if it has one) and hands it back.
    pub(crate) fn surface(&mut self, err: ConsoleError) -> ConsoleError {
        if let Some(message) = err.toast_message() {
            warn!(error = %err, "operation failed");
            self.toast(ToastLevel::Error, message);
        }
        err
    }
}

/// Snapshot handed to the view after each command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub view: String,
    pub module: &'static str,
    pub title: &'static str,
    pub mode: FormMode,
    pub save_label: &'static str,
    pub form: Value,
    pub references: ReferenceLists,
    pub grid: Option<GridModel>,
    pub preview: Preview,
    pub staged_file: Option<String>,
    pub pending_delete: Option<String>,
    pub pay_slip: Option<Preview>,
    pub ledger: Option<LedgerView>,
    pub events: Vec<UiEvent>,
}

pub(crate) fn keep_first(outcome: &mut ConsoleResult<()>, result: ConsoleResult<()>) {
    if let Err(err) = result {
        if outcome.is_ok() {
            *outcome = Err(err);
        }
    }
}

/// State and operations of one open console page.
///
/// Network calls are made without holding the page lock. Each call takes a
/// request ticket, and its completion is applied only while that ticket is
/// still current, so a superseded or cancelled response never lands.
pub struct PageController {
    view: String,
    module: &'static ModuleSpec,
    client: ApiClient,
    sessions: Arc<SessionStore>,
    inflight: InFlight,
    state: Mutex<PageState>,
}

impl PageController {
    pub fn new(
        view: &str,
        module: &'static ModuleSpec,
        client: ApiClient,
        sessions: Arc<SessionStore>,
        inflight: InFlight,
    ) -> Self {
        let placeholder = Preview::placeholder(&client.config().placeholder_image);
        Self {
            view: view.to_string(),
            module,
            client,
            sessions,
            inflight,
            state: Mutex::new(PageState {
                session: None,
                closed: false,
                form: FormState::new(module.fields),
                references: ReferenceLists::default(),
                grid: None,
                pending_delete: None,
                staged_file: None,
                preview: placeholder,
                pay_slip: None,
                document: None,
                ledger: None,
                events: Vec::new(),
            }),
        }
    }

    pub fn module(&self) -> &'static ModuleSpec {
        self.module
    }

    pub fn view_id(&self) -> &str {
        &self.view
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    pub(crate) fn session(&self) -> ConsoleResult<SessionContext> {
        let state = self.lock();
        if state.closed {
            return Err(ConsoleError::Cancelled);
        }
        state.session.clone().ok_or(ConsoleError::MissingSession)
    }

    fn slot_name(pane: Pane, slot: &str) -> String {
        format!("{}/{}", pane.tag(), slot)
    }

    pub(crate) fn ticket(&self, pane: Pane, slot: &str) -> RequestTicket {
        self.inflight.begin(&self.view, &Self::slot_name(pane, slot))
    }

    pub(crate) fn cancel(&self, pane: Pane, slot: &str) {
        self.inflight.cancel(&self.view, &Self::slot_name(pane, slot));
    }

    pub(crate) fn cancel_pane(&self, pane: Pane) {
        self.inflight
            .cancel_prefix(&self.view, &format!("{}/", pane.tag()));
    }

    /// Applies a completion under the page lock if its ticket is still
    /// current; failures are toasted and returned.
    pub(crate) fn complete<T, R>(
        &self,
        ticket: RequestTicket,
        result: ConsoleResult<T>,
        apply: impl FnOnce(&mut PageState, T) -> R,
    ) -> ConsoleResult<R> {
        let mut state = self.lock();
        if state.closed {
            return Err(ConsoleError::Cancelled);
        }
        match ticket.finish(result) {
            Ok(value) => Ok(apply(&mut state, value)),
            Err(err) => Err(state.surface(err)),
        }
    }

    /// Rejects an operator action locally, with a toast and no request.
    pub(crate) fn reject(&self, message: &str) -> ConsoleError {
        self.lock()
            .surface(ConsoleError::Input(message.to_string()))
    }

    fn user_prefix(&self) -> &str {
        self.client.config().services.prefix(Service::User)
    }

    pub(crate) fn references_of(&self, pane: Pane) -> &'static [ReferenceSpec] {
        match pane {
            Pane::Record => self.module.references,
            Pane::Ledger => self.module.ledger.map(|ledger| ledger.references).unwrap_or(&[]),
        }
    }

    pub(crate) fn lookups_of(&self, pane: Pane) -> &'static [LookupSpec] {
        match pane {
            Pane::Record => self.module.lookups,
            Pane::Ledger => self.module.ledger.map(|ledger| ledger.lookups).unwrap_or(&[]),
        }
    }

    fn attachment_field(&self) -> Option<&'static str> {
        self.module
            .fields
            .iter()
            .find(|field| field.kind == FieldKind::Attachment)
            .map(|field| field.key)
    }

    fn module_path(&self, action: &str) -> String {
        self.client
            .service_path(self.module.service, &self.module.path(action))
    }

    /// Session guard, then reference lists, then the record list. Without a
    /// token nothing is requested and the page navigates to the login screen.
    pub fn open(&self) -> ConsoleResult<()> {
        let context = match self.sessions.guard() {
            Guard::Authenticated(context) => context,
            Guard::LoggedOut(navigation) => {
                warn!(module = self.module.key, "no session token, returning to login");
                let path = navigation.path(self.user_prefix());
                let mut state = self.lock();
                state.session = None;
                state.events.push(UiEvent::Navigate { path });
                return Err(ConsoleError::MissingSession);
            }
        };
        info!(
            module = self.module.key,
            view = %self.view,
            session = %context.fingerprint(),
            "page opened"
        );
        {
            let mut state = self.lock();
            state.session = Some(context);
            state.closed = false;
        }
        let mut outcome = self.load_references(Pane::Record);
        keep_first(&mut outcome, self.reload_list());
        outcome
    }

    /// Loads every reference list of `pane`. Lists whose parent is unset
    /// are emptied instead of fetched.
    pub fn load_references(&self, pane: Pane) -> ConsoleResult<()> {
        let mut outcome = Ok(());
        for reference in self.references_of(pane) {
            keep_first(&mut outcome, self.refresh_reference(pane, reference));
        }
        outcome
    }

    pub(crate) fn refresh_reference(
        &self,
        pane: Pane,
        reference: &'static ReferenceSpec,
    ) -> ConsoleResult<()> {
        let session = self.session()?;
        let slot = format!("reference:{}", reference.target);
        let path = {
            let state = self.lock();
            let form = state.form(pane)?;
            resolve_path(reference.path, |key| form.value(key))
        };
        let Some(path) = path else {
            self.cancel(pane, &slot);
            self.lock().lists_mut(pane)?.clear(reference.target);
            return Ok(());
        };
        let ticket = self.ticket(pane, &slot);
        let result = self
            .client
            .get(&session, &self.client.service_path(reference.service, &path));
        self.complete(ticket, result, |state, success| {
            let list = OptionList::from_items(reference, &success.content);
            if let Ok(lists) = state.lists_mut(pane) {
                lists.replace(reference.target, list);
            }
        })
    }

    pub fn reload_list(&self) -> ConsoleResult<()> {
        let session = self.session()?;
        let ticket = self.ticket(Pane::Record, "list");
        let result = self.client.get(&session, &self.module_path("getAll"));
        let module = self.module;
        self.complete(ticket, result, |state, success| {
            state.grid = Some(grid::render(
                module.title,
                module.columns,
                module.row_actions,
                &success.content,
            ));
        })
    }

    /// Plain input edit; no dependent loads.
    pub fn set_field(&self, pane: Pane, key: &str, value: &str) -> ConsoleResult<()> {
        let mut state = self.lock();
        let result = state.form_mut(pane).and_then(|form| form.set(key, value));
        result.map_err(|err| state.surface(err))
    }

    pub fn toggle_option(&self, pane: Pane, key: &str, value: &str, checked: bool) -> ConsoleResult<()> {
        let mut state = self.lock();
        let result = state
            .form_mut(pane)
            .and_then(|form| form.toggle(key, value, checked));
        result.map_err(|err| state.surface(err))
    }

    pub fn check_all(&self, pane: Pane, key: &str, checked: bool) -> ConsoleResult<()> {
        let mut state = self.lock();
        let options = state
            .lists(pane)
            .map(|lists| lists.get(key).cloned().unwrap_or_default());
        let result = options.and_then(|options| {
            state
                .form_mut(pane)
                .and_then(|form| form.check_all(key, &options, checked))
        });
        result.map_err(|err| state.surface(err))
    }

    /// A select changed: store it, reset and reload the lists that depend on
    /// it, and run the lookups it triggers.
    pub fn select_changed(&self, pane: Pane, key: &str, value: &str) -> ConsoleResult<()> {
        self.set_field(pane, key, value)?;
        self.propagate(pane, key, 0)
    }

    fn propagate(&self, pane: Pane, key: &str, depth: usize) -> ConsoleResult<()> {
        if depth > MAX_LOOKUP_DEPTH {
            return Ok(());
        }
        let mut outcome = Ok(());
        for reference in self
            .references_of(pane)
            .iter()
            .filter(|reference| reference.depends_on == Some(key))
        {
            if let Ok(form) = self.lock().form_mut(pane) {
                form.reset(reference.target);
            }
            keep_first(&mut outcome, self.refresh_reference(pane, reference));
            keep_first(&mut outcome, self.propagate(pane, reference.target, depth + 1));
        }
        for spec in self
            .lookups_of(pane)
            .iter()
            .filter(|spec| spec.trigger == key)
        {
            keep_first(&mut outcome, self.run_lookup(pane, spec, depth));
        }
        outcome
    }

    pub(crate) fn run_lookup(
        &self,
        pane: Pane,
        spec: &'static LookupSpec,
        depth: usize,
    ) -> ConsoleResult<()> {
        if depth > MAX_LOOKUP_DEPTH {
            return Ok(());
        }
        let session = self.session()?;
        let slot = format!("lookup:{}", spec.trigger);
        let path = {
            let state = self.lock();
            let form = state.form(pane)?;
            resolve_path(spec.path, |key| form.value(key))
        };
        let changed = match path {
            None => {
                self.cancel(pane, &slot);
                let mut state = self.lock();
                let form = state.form_mut(pane)?;
                lookup::reset(spec, form)
            }
            Some(path) => {
                let ticket = self.ticket(pane, &slot);
                let result = self
                    .client
                    .get(&session, &self.client.service_path(spec.service, &path));
                self.complete(ticket, result, |state, success| {
                    state
                        .form_mut(pane)
                        .map(|form| lookup::apply(spec, &success.content, form))
                        .unwrap_or_default()
                })?
            }
        };
        let mut outcome = Ok(());
        for key in changed {
            for next in self
                .lookups_of(pane)
                .iter()
                .filter(|next| next.trigger == key)
            {
                keep_first(&mut outcome, self.run_lookup(pane, next, depth + 1));
            }
        }
        outcome
    }

    /// Keeps a picked file for the next save and previews it right away.
    pub fn stage_file(&self, file: StagedFile) -> ConsoleResult<()> {
        if self.module.attachment.is_none() {
            return Err(self.reject("This page does not take attachments."));
        }
        self.cancel(Pane::Record, "preview");
        let mut state = self.lock();
        state.preview = file.preview();
        state.document = None;
        state.staged_file = Some(file);
        Ok(())
    }

    fn reset_form(&self, state: &mut PageState) {
        state.form.clear();
        state.staged_file = None;
        state.document = None;
        state.preview = Preview::placeholder(&self.client.config().placeholder_image);
    }

    /// Clears the form back to create mode and reloads the list.
    pub fn clear(&self) -> ConsoleResult<()> {
        self.cancel(Pane::Record, "record");
        self.cancel(Pane::Record, "preview");
        {
            let mut state = self.lock();
            self.reset_form(&mut state);
        }
        self.reload_list()
    }

    /// Uploads a staged attachment if there is one, then posts the trimmed
    /// payload. On success the form is cleared and the list reloaded; on
    /// failure the form is left as it was.
    ///
    /// A failed upload stops before the save and keeps the staged file. Once
    /// an upload succeeds the stored name is in `fileName` and the staged file
    /// is dropped, so retrying after a failed save re-sends that name without
    /// uploading again.
    pub fn save_or_update(&self) -> ConsoleResult<()> {
        let session = self.session()?;
        let staged = self.lock().staged_file.clone();
        if let (Some(file_type), Some(field), Some(file)) =
            (self.module.attachment, self.attachment_field(), staged)
        {
            self.upload(&session, &file, file_type, field)?;
        }

        let (payload, mode) = {
            let state = self.lock();
            (state.form.payload(), state.form.mode())
        };
        let ticket = self.ticket(Pane::Record, "save");
        let result = self
            .client
            .post(&session, &self.module_path("saveUpdate"), payload);
        let module = self.module.key;
        self.complete(ticket, result, |state, success| {
            info!(module, ?mode, "record saved");
            state.toast(ToastLevel::Success, success.message);
            self.reset_form(state);
        })?;
        self.reload_list()
    }

    fn upload(
        &self,
        session: &SessionContext,
        file: &StagedFile,
        file_type: FileType,
        field: &str,
    ) -> ConsoleResult<()> {
        let ticket = self.ticket(Pane::Record, "upload");
        let result = self.client.upload(session, file, file_type);
        self.complete(ticket, result, |state, stored| {
            info!(file = %file.name, stored = %stored, "attachment uploaded");
            match state.form.set(field, &stored) {
                Ok(()) => {
                    state.staged_file = None;
                    Ok(())
                }
                Err(err) => Err(state.surface(err)),
            }
        })?
    }

    /// Loads a record into the form (update mode), rescopes dependent lists
    /// to its keys, re-runs its lookups and previews its attachment.
    pub fn record_edit(&self, id: &str) -> ConsoleResult<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(self.reject("No record selected."));
        }
        let session = self.session()?;
        let ticket = self.ticket(Pane::Record, "record");
        let result = self
            .client
            .get(&session, &self.module_path(&format!("getById/{id}")));
        let record = self.complete(ticket, result, |state, success| {
            state.form.back_fill(&success.content);
            state.staged_file = None;
            success.content
        })?;

        let mut outcome = Ok(());
        for reference in self
            .module
            .references
            .iter()
            .filter(|reference| reference.depends_on.is_some())
        {
            keep_first(&mut outcome, self.refresh_reference(Pane::Record, reference));
        }
        for spec in self.module.lookups.iter().filter(|spec| {
            self.module
                .field(spec.trigger)
                .is_some_and(|field| field.sent)
        }) {
            keep_first(&mut outcome, self.run_lookup(Pane::Record, spec, 0));
        }
        if let Some(file_type) = self.module.attachment {
            keep_first(&mut outcome, self.load_preview(&session, &record, file_type));
        }
        outcome
    }

    fn load_preview(
        &self,
        session: &SessionContext,
        record: &Value,
        file_type: FileType,
    ) -> ConsoleResult<()> {
        let id = row_string(record, "id");
        let file_name = row_string(record, "fileName");
        if file_name.trim().is_empty() {
            self.cancel(Pane::Record, "preview");
            let mut state = self.lock();
            state.preview = Preview::placeholder(&self.client.config().placeholder_image);
            state.document = None;
            return Ok(());
        }
        match preview::record_kind(record) {
            PreviewKind::Image => {
                self.cancel(Pane::Record, "preview");
                let mut state = self.lock();
                state.preview = Preview::Image {
                    src: self.client.image_url(&id, &file_name, file_type),
                };
                state.document = None;
                Ok(())
            }
            PreviewKind::Pdf => {
                let ticket = self.ticket(Pane::Record, "preview");
                let path = self.client.pdf_download_path(&id, &file_name, file_type);
                let result = self
                    .client
                    .pdf_items(session, &path)
                    .and_then(|items| preview::pdf_preview(&items));
                self.complete(ticket, result, |state, (shown, blob)| {
                    state.preview = shown;
                    state.document = blob;
                })
            }
        }
    }

    /// Remembers which record the delete dialog is about. Makes no request.
    pub fn delete_record(&self, id: &str) -> ConsoleResult<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(self.reject("No record selected."));
        }
        self.lock().pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&self) {
        let mut state = self.lock();
        state.pending_delete = None;
        state.events.push(UiEvent::CloseModal {
            modal: Modal::Delete,
        });
    }

    /// Deletes the record stashed by [`delete_record`](Self::delete_record).
    pub fn confirm_delete(&self) -> ConsoleResult<()> {
        let session = self.session()?;
        let pending = self.lock().pending_delete.clone();
        let Some(id) = pending else {
            return Err(self.reject("No record selected for deletion."));
        };
        let ticket = self.ticket(Pane::Record, "delete");
        let result = self
            .client
            .delete(&session, &self.module_path(&format!("deleteById/{id}")));
        let module = self.module.key;
        self.complete(ticket, result, |state, success| {
            info!(module, id = %id, "record deleted");
            state.toast(ToastLevel::Success, success.message);
            state.events.push(UiEvent::CloseModal {
                modal: Modal::Delete,
            });
            state.pending_delete = None;
            self.reset_form(state);
        })?;
        self.reload_list()
    }

    /// Fetches and decodes the pay slip PDF of a salary row.
    pub fn pay_slip(&self, id: &str) -> ConsoleResult<()> {
        if !self.module.row_actions.contains(&RowAction::PaySlip) {
            return Err(self.reject("This page has no pay slips."));
        }
        let id = id.trim();
        if id.is_empty() {
            return Err(self.reject("No record selected."));
        }
        let session = self.session()?;
        let ticket = self.ticket(Pane::Record, "pay-slip");
        let result = self
            .client
            .pdf_items(&session, &self.module_path(&format!("exportPaySlip/{id}")))
            .and_then(|items| preview::pdf_preview(&items));
        self.complete(ticket, result, |state, (shown, blob)| {
            state.pay_slip = Some(shown);
            state.document = blob;
        })
    }

    pub fn close_pay_slip(&self) {
        self.cancel(Pane::Record, "pay-slip");
        let mut state = self.lock();
        state.pay_slip = None;
        state.events.push(UiEvent::CloseModal {
            modal: Modal::PaySlip,
        });
    }

    /// Last decoded PDF (attachment or pay slip), for an external viewer.
    pub fn document(&self) -> Option<PdfBlob> {
        self.lock().document.clone()
    }

    /// Excel export of the current grid as `(file name, csv)`.
    pub fn export_csv(&self) -> ConsoleResult<(String, String)> {
        let grid = self.lock().grid.clone();
        let Some(grid) = grid else {
            return Err(self.reject("Nothing to export yet."));
        };
        Ok((
            sanitize_export_filename(self.module.title),
            grid_to_csv(&grid, self.module.columns),
        ))
    }

    /// Leaves the page: every outstanding request is cancelled and later
    /// completions are dropped.
    pub fn navigate_away(&self) {
        let cancelled = self.inflight.cancel_view(&self.view);
        let mut state = self.lock();
        state.closed = true;
        state.session = None;
        info!(module = self.module.key, view = %self.view, cancelled, "page closed");
    }

    /// Logs out when the stored session has expired (or is gone).
    pub fn check_expiry(&self, now: OffsetDateTime) -> bool {
        let expired = match self.sessions.context() {
            Some(context) => context.is_expired(now),
            None => true,
        };
        if !expired {
            return false;
        }
        self.sessions.clear();
        self.navigate_away();
        let path = Navigation::Login.path(self.user_prefix());
        self.lock().events.push(UiEvent::Navigate { path });
        true
    }

    pub fn form_value(&self, pane: Pane, key: &str) -> Option<String> {
        self.lock()
            .form(pane)
            .ok()
            .and_then(|form| form.value(key).map(str::to_string))
    }

    pub fn checked_values(&self, pane: Pane, key: &str) -> Vec<String> {
        self.lock()
            .form(pane)
            .map(|form| form.checked(key).to_vec())
            .unwrap_or_default()
    }

    pub fn options(&self, pane: Pane, target: &str) -> Option<OptionList> {
        self.lock()
            .lists(pane)
            .ok()
            .and_then(|lists| lists.get(target).cloned())
    }

    pub fn grid(&self) -> Option<GridModel> {
        self.lock().grid.clone()
    }

    pub fn preview(&self) -> Preview {
        self.lock().preview.clone()
    }

    pub fn pending_delete(&self) -> Option<String> {
        self.lock().pending_delete.clone()
    }

    pub fn mode(&self) -> FormMode {
        self.lock().form.mode()
    }

    pub fn take_events(&self) -> Vec<UiEvent> {
        std::mem::take(&mut self.lock().events)
    }

    /// Current snapshot. Queued events move into the snapshot.
    pub fn view(&self) -> PageView {
        let mut state = self.lock();
        let events = std::mem::take(&mut state.events);
        PageView {
            view: self.view.clone(),
            module: self.module.key,
            title: self.module.title,
            mode: state.form.mode(),
            save_label: state.form.save_label(),
            form: state.form.snapshot(),
            references: state.references.clone(),
            grid: state.grid.clone(),
            preview: state.preview.clone(),
            staged_file: state.staged_file.as_ref().map(|file| file.name.clone()),
            pending_delete: state.pending_delete.clone(),
            pay_slip: state.pay_slip.clone(),
            ledger: state.ledger.as_ref().map(LedgerState::view),
            events,
        }
    }
}
