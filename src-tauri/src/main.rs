#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use cims_tauri::commands::{self, AppState};
use cims_tauri::config::CONFIG_FILE;
use cims_tauri::{logging, ConsoleConfig};
use tauri::Manager;

fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let config_path = app.path().app_data_dir()?.join(CONFIG_FILE);
            let config = ConsoleConfig::load(&config_path)?.apply_env()?;
            logging::init(&config.log_level);
            tracing::info!(
                base_url = %config.base_url,
                config = %config_path.display(),
                "console starting"
            );
            app.manage(AppState::new(config));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::app_version,
            commands::login,
            commands::login_notice,
            commands::internal_redirect,
            commands::logout,
            commands::session_set_expiry,
            commands::session_check_expiry,
            commands::page_open,
            commands::page_view,
            commands::page_close,
            commands::page_select_changed,
            commands::page_set_field,
            commands::page_toggle_option,
            commands::page_check_all,
            commands::page_save,
            commands::page_clear,
            commands::page_edit,
            commands::page_delete,
            commands::page_confirm_delete,
            commands::page_cancel_delete,
            commands::page_stage_file,
            commands::ledger_open,
            commands::ledger_save,
            commands::ledger_close,
            commands::pay_slip,
            commands::pay_slip_close,
            commands::grid_export_csv,
            commands::open_document
        ])
        .run(tauri::generate_context!())
        .expect("failed to run CIMS Console");
}
