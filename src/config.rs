use std::env;

/// Endpoint used when no override is supplied.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Connection settings for the hosted backend, read from the
/// environment once at startup.
///
/// Apart from the endpoint, every value defaults to an empty string —
/// the remote service will reject calls made with missing identifiers,
/// which is the intended failure mode for an unconfigured install.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
}

impl RemoteConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("APPWRITE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            project_id: env_or_empty("APPWRITE_PROJECT_ID"),
            database_id: env_or_empty("APPWRITE_DATABASE_ID"),
            collection_id: env_or_empty("APPWRITE_UPLOADS_COLLECTION_ID"),
            bucket_id: env_or_empty("APPWRITE_BUCKET_ID"),
        }
    }
}

fn env_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_default()
}
