use crate::remote::RemoteClient;
use crate::session::SessionGate;
use crate::uploads::Dashboard;
use std::sync::Mutex;

/// Represents the global runtime state of the application, constructed
/// once during setup and managed by Tauri.
///
/// - `gate`: the Session Gate (login state plus its persistence store).
/// - `dashboard`: the upload list, selection, and in-flight flag.
/// - `remote`: shared client for the hosted backend; immutable, so it
///   needs no lock.
///
/// Each mutable piece sits behind its own `Mutex`. Guards are never
/// held across an await: commands read what they need before a remote
/// call and write results back after it completes.
pub struct AppState {
    pub gate: Mutex<SessionGate>,
    pub dashboard: Mutex<Dashboard>,
    pub remote: RemoteClient,
}

impl AppState {
    pub fn new(gate: SessionGate, remote: RemoteClient) -> Self {
        Self {
            gate: Mutex::new(gate),
            dashboard: Mutex::new(Dashboard::new()),
            remote,
        }
    }
}
