use crate::state::AppState;
use crate::uploads::{self, UploadRecord};
use std::fs;
use std::path::Path;
use tauri::State;

// Define a standard Result type for commands (returns data or an error string)
pub type CommandResult<T> = Result<T, String>;

const NOT_LOGGED_IN: &str = "Not logged in.";

// --- AUTH ---

/// Tells the frontend which view to route to on mount.
#[tauri::command]
pub fn check_auth_status(state: State<AppState>) -> String {
    let gate = state.gate.lock().unwrap();
    if gate.is_authenticated() {
        "authenticated".to_string()
    } else {
        "login_needed".to_string()
    }
}

/// Returns `Ok(false)` for a non-conforming password; `Err` only when
/// the session could not be persisted.
#[tauri::command]
pub fn login(state: State<AppState>, username: String, password: String) -> CommandResult<bool> {
    let mut gate = state.gate.lock().unwrap();
    gate.login(&username, &password).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn logout(state: State<AppState>) -> CommandResult<()> {
    let mut gate = state.gate.lock().unwrap();
    gate.logout().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn current_user(state: State<AppState>) -> CommandResult<String> {
    let gate = state.gate.lock().unwrap();
    if !gate.is_authenticated() {
        return Err(NOT_LOGGED_IN.to_string());
    }
    Ok(gate.username().to_string())
}

// --- DASHBOARD ---

/// Fetches the full upload list from the document store and replaces
/// the local cache. On failure the cache is left untouched and the
/// error string is returned for the frontend to show or ignore.
#[tauri::command]
pub async fn load_uploads(state: State<'_, AppState>) -> CommandResult<Vec<UploadRecord>> {
    {
        let gate = state.gate.lock().unwrap();
        if !gate.is_authenticated() {
            return Err(NOT_LOGGED_IN.to_string());
        }
    }

    match state.remote.list_documents().await {
        Ok(records) => {
            let mut dashboard = state.dashboard.lock().unwrap();
            dashboard.set_uploads(records.clone());
            Ok(records)
        }
        Err(e) => {
            eprintln!("Error loading uploads: {}", e);
            Err(e.to_string())
        }
    }
}

/// The core upload sequence. Validates the picked file, stores the
/// bytes remotely, writes the metadata record, then prepends the new
/// record to the cache and selects it.
///
/// Type validation happens before the in-flight flag is set, so a
/// rejected file never blocks a follow-up attempt.
#[tauri::command]
pub async fn upload_image(
    state: State<'_, AppState>,
    file_path: String,
) -> CommandResult<UploadRecord> {
    let username = {
        let gate = state.gate.lock().unwrap();
        if !gate.is_authenticated() {
            return Err(NOT_LOGGED_IN.to_string());
        }
        gate.username().to_string()
    };

    let bytes = fs::read(&file_path).map_err(|e| format!("Failed to read file: {}", e))?;
    let file_name = Path::new(&file_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| "Invalid file path".to_string())?;

    let mime = match uploads::detect_mime(&bytes, &file_name) {
        Some(m) if uploads::is_accepted_image(&m) => m,
        _ => return Err(uploads::INVALID_TYPE_MESSAGE.to_string()),
    };

    // The ticket clears the in-flight flag on drop, including when
    // this future is cancelled before the sequence completes.
    let ticket = match uploads::UploadTicket::acquire(&state.dashboard) {
        Some(ticket) => ticket,
        None => return Err("An upload is already in progress.".to_string()),
    };

    let result = uploads::perform_upload(&state.remote, &username, &file_name, &mime, bytes).await;

    let outcome = match result {
        Ok(record) => {
            let mut dashboard = state.dashboard.lock().unwrap();
            dashboard.record_upload(record.clone());
            Ok(record)
        }
        Err(e) => Err(e.to_string()),
    };
    drop(ticket);
    outcome
}

/// Switches the displayed image. The cache already holds everything
/// needed for display, so there is no network call here.
#[tauri::command]
pub fn select_upload(state: State<AppState>, id: String) -> CommandResult<UploadRecord> {
    let mut dashboard = state.dashboard.lock().unwrap();
    dashboard
        .select(&id)
        .ok_or_else(|| format!("Unknown upload: {}", id))
}

#[tauri::command]
pub fn selected_upload(state: State<AppState>) -> Option<UploadRecord> {
    let dashboard = state.dashboard.lock().unwrap();
    dashboard.selected().cloned()
}

#[tauri::command]
pub fn clear_selection(state: State<AppState>) {
    let mut dashboard = state.dashboard.lock().unwrap();
    dashboard.clear_selection();
}
