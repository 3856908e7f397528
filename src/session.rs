use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

// --- Persisted Keys ---
// The same key names the dashboard has always used, so an existing
// session file keeps working across versions.

pub const AUTH_KEY: &str = "isAuthenticated";
pub const USERNAME_KEY: &str = "username";

/// Display name used when the user logs in without typing a name.
pub const FALLBACK_USERNAME: &str = "Guest";

/// Key-value persistence port for the session.
///
/// Mirrors the three operations the gate needs (read, write, clear),
/// so the gate can be tested against an in-memory store instead of the
/// real on-disk one.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// The current login state. `authenticated` is a local convention, not
/// a security boundary: there is no password storage and no server
/// round-trip, only a format check on the password at login time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub authenticated: bool,
    pub username: String,
}

/// The Session Gate: owns the current session plus the store it
/// persists to. Constructed exactly once at startup (see `lib.rs`) and
/// hydrated from whatever the store remembers.
pub struct SessionGate {
    session: Session,
    store: Box<dyn SessionStore>,
}

// Accepted passwords are exactly four decimal digits.
fn password_is_valid(password: &str) -> bool {
    password.len() == 4 && password.chars().all(|c| c.is_ascii_digit())
}

impl SessionGate {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let session = restore(store.as_ref());
        Self { session, store }
    }

    /// Attempts to log in. Returns `Ok(false)` when the password does
    /// not conform (state and store untouched, no error detail by
    /// design); `Err` only when persisting the session fails.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        if !password_is_valid(password) {
            return Ok(false);
        }

        let name = username.trim();
        let name = if name.is_empty() { FALLBACK_USERNAME } else { name };

        self.store.set(AUTH_KEY, "true")?;
        self.store.set(USERNAME_KEY, name)?;

        self.session.authenticated = true;
        self.session.username = name.to_string();
        Ok(true)
    }

    /// Clears the session and erases the persisted entries. Idempotent.
    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(AUTH_KEY)?;
        self.store.remove(USERNAME_KEY)?;

        self.session.authenticated = false;
        self.session.username.clear();
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    pub fn username(&self) -> &str {
        &self.session.username
    }
}

/// Rebuilds the session from the store. Only the exact string "true"
/// under the auth key counts as logged in; anything else starts the
/// session unauthenticated.
fn restore(store: &dyn SessionStore) -> Session {
    if store.get(AUTH_KEY).as_deref() == Some("true") {
        Session {
            authenticated: true,
            username: store
                .get(USERNAME_KEY)
                .unwrap_or_else(|| FALLBACK_USERNAME.to_string()),
        }
    } else {
        Session::default()
    }
}

// --- Store Implementations ---

/// On-disk store: a flat string map serialized as JSON in the app data
/// directory. Every set/remove writes through immediately, so a crash
/// never loses a completed login or logout.
pub struct FileSessionStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileSessionStore {
    /// Opens (or initializes) the store. A missing file is an empty
    /// store; an unreadable or corrupted file is an error, surfaced at
    /// startup rather than at first use.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file {:?}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Corrupted session file {:?}", path))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<()> {
        let file = fs::File::create(&self.path)
            .with_context(|| format!("Failed to write session file {:?}", self.path))?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
