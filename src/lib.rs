mod commands;
mod config;
mod remote;
mod session;
mod state;
mod uploads;


use crate::config::RemoteConfig;
use crate::remote::RemoteClient;
use crate::session::{FileSessionStore, SessionGate};
use crate::state::AppState;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            // Everything the commands need is built here, once. A
            // session store that cannot be opened aborts startup
            // instead of failing at first use.
            let data_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&data_dir)?;

            let store = FileSessionStore::open(data_dir.join("session.json"))?;
            let gate = SessionGate::new(Box::new(store));
            let remote = RemoteClient::new(RemoteConfig::from_env());

            app.manage(AppState::new(gate, remote));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::check_auth_status,
            commands::login,
            commands::logout,
            commands::current_user,
            commands::load_uploads,
            commands::upload_image,
            commands::select_upload,
            commands::selected_upload,
            commands::clear_selection,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
