//! The resolved run configuration.
//!
//! [`Config`] is built once from the command line (see [`crate::cli`]) and
//! then handed to the rest of the workflow.

use std::path::PathBuf;

use tracing::info;

/// The environment variable read when `--key` is not given.
pub const API_KEY_ENV: &str = "DERPIBOORUAPIKEY";

/// Everything one run needs: where to put files, and what to ask the API.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Config {
    /// The directory where downloaded images will be dropped off.
    pub destdir: PathBuf,
    /// The search to execute against the Derpibooru API.
    pub search: SearchQuery,
}

/// One search request: credential, query text and result limit.
///
/// Construct it with [`SearchQuery::resolve`] so the credential fallback
/// is applied consistently.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The API key, if any. Anonymous queries are allowed with reduced quotas.
    pub key: Option<String>,
    /// The query text. An empty string matches everything.
    pub query: String,
    /// The maximum number of records to request. May be `0`.
    pub limit: u64,
}

impl SearchQuery {
    /// Build a query, filling a missing `key` from the [`API_KEY_ENV`]
    /// environment variable.
    ///
    /// A key that is absent in both places is not an error; the run
    /// continues unauthenticated and a note is logged.
    pub fn resolve(key: Option<String>, query: String, limit: u64) -> Self {
        let key = Self::resolve_key(key, std::env::var(API_KEY_ENV).ok());
        Self { key, query, limit }
    }

    fn resolve_key(explicit: Option<String>, from_env: Option<String>) -> Option<String> {
        let key = explicit.or(from_env);
        if key.is_none() {
            info!("no API key was set ({API_KEY_ENV}), querying anonymously");
        }
        key
    }
}
