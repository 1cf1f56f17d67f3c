//! Tauri commands. Each forwards to the headless page layer and answers with
//! the page snapshot so the webview only renders.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, State};
use tauri_plugin_opener::OpenerExt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use crate::catalog::{self, ModuleSpec};
use crate::client::ApiClient;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::export::sanitize_filename;
use crate::inflight::InFlight;
use crate::page::{PageController, PageView, Pane};
use crate::preview::StagedFile;
use crate::session::{is_logged_out_location, Authenticator, SessionStore};

const DOCUMENTS_DIR: &str = "documents";

pub struct AppState {
    client: ApiClient,
    sessions: Arc<SessionStore>,
    auth: Authenticator,
    inflight: InFlight,
    pages: Mutex<HashMap<String, Arc<PageController>>>,
    next_view: AtomicU64,
}

impl AppState {
    pub fn new(config: ConsoleConfig) -> Self {
        let client = ApiClient::with_ureq(config);
        let sessions = Arc::new(SessionStore::new());
        Self {
            auth: Authenticator::new(client.clone(), sessions.clone()),
            client,
            sessions,
            inflight: InFlight::new(),
            pages: Mutex::new(HashMap::new()),
            next_view: AtomicU64::new(1),
        }
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<String, Arc<PageController>>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn page(&self, view: &str) -> Result<Arc<PageController>, String> {
        self.pages()
            .get(view)
            .cloned()
            .ok_or_else(|| format!("Unknown view: {view}"))
    }

    fn open_page(&self, module: &'static ModuleSpec) -> PageResult {
        let view = format!(
            "{}-{}",
            module.key,
            self.next_view.fetch_add(1, Ordering::Relaxed)
        );
        let page = Arc::new(PageController::new(
            &view,
            module,
            self.client.clone(),
            self.sessions.clone(),
            self.inflight.clone(),
        ));
        self.pages().insert(view.clone(), page.clone());
        let result = page.open();
        let logged_out = matches!(result, Err(ConsoleError::MissingSession));
        let outcome = page_result(&page, result);
        // A logged-out page is dropped; a failed load keeps it until `page_close`.
        if logged_out {
            self.pages().remove(&view);
            page.navigate_away();
        }
        outcome
    }

    fn close_all(&self) {
        let pages: Vec<_> = self.pages().drain().map(|(_, page)| page).collect();
        for page in pages {
            page.navigate_away();
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    user_name: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResult {
    ok: bool,
    path: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LocationRequest {
    location: String,
}

#[derive(Deserialize)]
pub struct RedirectRequest {
    page: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryRequest {
    expires_at: String,
}

#[derive(Deserialize)]
pub struct OpenPageRequest {
    module: String,
}

#[derive(Deserialize)]
pub struct ViewRequest {
    view: String,
}

#[derive(Deserialize)]
pub struct RowRequest {
    view: String,
    id: String,
}

#[derive(Deserialize)]
pub struct FieldRequest {
    view: String,
    pane: Pane,
    key: String,
    value: String,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    view: String,
    pane: Pane,
    key: String,
    #[serde(default)]
    value: String,
    checked: bool,
}

#[derive(Serialize)]
pub struct PageResult {
    ok: bool,
    error: Option<String>,
    view: PageView,
}

#[derive(Serialize)]
pub struct SaveCsvResult {
    ok: bool,
    canceled: bool,
    filename: String,
    path: Option<String>,
    error: Option<String>,
}

fn page_result(page: &PageController, result: ConsoleResult<()>) -> PageResult {
    PageResult {
        ok: result.is_ok(),
        error: result.err().and_then(|err| err.toast_message()),
        view: page.view(),
    }
}

fn with_page(
    state: &AppState,
    view: &str,
    operation: impl FnOnce(&PageController) -> ConsoleResult<()>,
) -> Result<PageResult, String> {
    let page = state.page(view)?;
    let result = operation(&page);
    Ok(page_result(&page, result))
}

#[tauri::command]
pub fn app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command(async)]
pub fn login(state: State<'_, AppState>, payload: LoginRequest) -> Result<LoginResult, String> {
    let outcome = state
        .auth
        .login(&payload.user_name, &payload.password)
        .and_then(|_| state.auth.page_redirection());
    Ok(match outcome {
        Ok(navigation) => LoginResult {
            ok: true,
            path: Some(state.auth.path(&navigation)),
            error: None,
        },
        Err(err) => LoginResult {
            ok: false,
            path: None,
            error: Some(err.to_string()),
        },
    })
}

/// Notice for the login screen when it was reached by logging out.
#[tauri::command]
pub fn login_notice(payload: LocationRequest) -> Option<String> {
    is_logged_out_location(&payload.location).then(|| "You have been logged out.".to_string())
}

#[tauri::command]
pub fn internal_redirect(
    state: State<'_, AppState>,
    payload: RedirectRequest,
) -> Result<String, String> {
    let navigation = state.auth.internal_redirection(&payload.page)?;
    Ok(state.auth.path(&navigation))
}

#[tauri::command]
pub fn logout(state: State<'_, AppState>) -> String {
    state.close_all();
    let navigation = state.auth.logout();
    state.auth.path(&navigation)
}

#[tauri::command]
pub fn session_set_expiry(
    state: State<'_, AppState>,
    payload: ExpiryRequest,
) -> Result<bool, String> {
    let expires_at = OffsetDateTime::parse(payload.expires_at.trim(), &Rfc3339)
        .map_err(|err| ConsoleError::Input(err.to_string()))?;
    state.sessions.set_expiry(expires_at)?;
    Ok(true)
}

/// Path to navigate to when the session just expired.
#[tauri::command]
pub fn session_check_expiry(state: State<'_, AppState>) -> Option<String> {
    let navigation = state.auth.expire_if_due(OffsetDateTime::now_utc())?;
    state.close_all();
    Some(state.auth.path(&navigation))
}

#[tauri::command(async)]
pub fn page_open(state: State<'_, AppState>, payload: OpenPageRequest) -> Result<PageResult, String> {
    let module = catalog::module(&payload.module)?;
    Ok(state.open_page(module))
}

#[tauri::command]
pub fn page_view(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageView, String> {
    Ok(state.page(&payload.view)?.view())
}

#[tauri::command]
pub fn page_close(state: State<'_, AppState>, payload: ViewRequest) -> bool {
    let page = state.pages().remove(&payload.view);
    match page {
        Some(page) => {
            page.navigate_away();
            true
        }
        None => false,
    }
}

#[tauri::command(async)]
pub fn page_select_changed(
    state: State<'_, AppState>,
    payload: FieldRequest,
) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.select_changed(payload.pane, &payload.key, &payload.value)
    })
}

#[tauri::command]
pub fn page_set_field(state: State<'_, AppState>, payload: FieldRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.set_field(payload.pane, &payload.key, &payload.value)
    })
}

#[tauri::command]
pub fn page_toggle_option(
    state: State<'_, AppState>,
    payload: ToggleRequest,
) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.toggle_option(payload.pane, &payload.key, &payload.value, payload.checked)
    })
}

#[tauri::command]
pub fn page_check_all(state: State<'_, AppState>, payload: ToggleRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.check_all(payload.pane, &payload.key, payload.checked)
    })
}

#[tauri::command(async)]
pub fn page_save(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, PageController::save_or_update)
}

#[tauri::command(async)]
pub fn page_clear(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, PageController::clear)
}

#[tauri::command(async)]
pub fn page_edit(state: State<'_, AppState>, payload: RowRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| page.record_edit(&payload.id))
}

#[tauri::command]
pub fn page_delete(state: State<'_, AppState>, payload: RowRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| page.delete_record(&payload.id))
}

#[tauri::command(async)]
pub fn page_confirm_delete(
    state: State<'_, AppState>,
    payload: ViewRequest,
) -> Result<PageResult, String> {
    with_page(&state, &payload.view, PageController::confirm_delete)
}

#[tauri::command]
pub fn page_cancel_delete(
    state: State<'_, AppState>,
    payload: ViewRequest,
) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.cancel_delete();
        Ok(())
    })
}

#[tauri::command]
pub fn page_stage_file(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    let page = state.page(&payload.view)?;
    let path = rfd::FileDialog::new()
        .add_filter("Images and PDF", &["png", "jpg", "jpeg", "gif", "pdf"])
        .pick_file();
    let Some(path) = path else {
        return Ok(page_result(&page, Ok(())));
    };
    let result = StagedFile::read(&path).and_then(|file| page.stage_file(file));
    Ok(page_result(&page, result))
}

#[tauri::command(async)]
pub fn ledger_open(state: State<'_, AppState>, payload: RowRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| page.open_ledger(&payload.id))
}

#[tauri::command(async)]
pub fn ledger_save(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, PageController::save_ledger_entry)
}

#[tauri::command]
pub fn ledger_close(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.close_ledger();
        Ok(())
    })
}

#[tauri::command(async)]
pub fn pay_slip(state: State<'_, AppState>, payload: RowRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| page.pay_slip(&payload.id))
}

#[tauri::command]
pub fn pay_slip_close(state: State<'_, AppState>, payload: ViewRequest) -> Result<PageResult, String> {
    with_page(&state, &payload.view, |page| {
        page.close_pay_slip();
        Ok(())
    })
}

#[tauri::command]
pub fn grid_export_csv(
    state: State<'_, AppState>,
    payload: ViewRequest,
) -> Result<SaveCsvResult, String> {
    let page = state.page(&payload.view)?;
    let (filename, content) = page.export_csv()?;
    let path = rfd::FileDialog::new()
        .set_file_name(filename.as_str())
        .save_file();

    let Some(path) = path else {
        return Ok(SaveCsvResult {
            ok: false,
            canceled: true,
            filename,
            path: None,
            error: None,
        });
    };

    if let Err(err) = fs::write(&path, content) {
        return Ok(SaveCsvResult {
            ok: false,
            canceled: false,
            filename,
            path: Some(path.to_string_lossy().to_string()),
            error: Some(err.to_string()),
        });
    }
    info!(path = %path.display(), "grid exported");
    Ok(SaveCsvResult {
        ok: true,
        canceled: false,
        filename,
        path: Some(path.to_string_lossy().to_string()),
        error: None,
    })
}

fn documents_dir(app: &AppHandle) -> Result<PathBuf, String> {
    let base = app.path().app_data_dir().map_err(|err| err.to_string())?;
    let dir = base.join(DOCUMENTS_DIR);
    fs::create_dir_all(dir.as_path()).map_err(|err| err.to_string())?;
    Ok(dir)
}

/// Writes the last decoded PDF of the page to disk and opens it in the
/// system viewer.
#[tauri::command]
pub fn open_document(
    app: AppHandle,
    state: State<'_, AppState>,
    payload: ViewRequest,
) -> Result<bool, String> {
    let page = state.page(&payload.view)?;
    let Some(document) = page.document() else {
        return Ok(false);
    };
    let mut name = document
        .file_name
        .as_deref()
        .map(sanitize_filename)
        .unwrap_or_else(|| format!("{}.pdf", page.module().key));
    if !name.to_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }
    let path = documents_dir(&app)?.join(name);
    fs::write(&path, &document.bytes).map_err(|err| err.to_string())?;
    app.opener()
        .open_url(path.to_string_lossy().to_string(), Option::<String>::None)
        .map_err(|err: tauri_plugin_opener::Error| err.to_string())?;
    Ok(true)
}
