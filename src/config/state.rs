// Application state module
// Immutable configuration shared by every connection

use std::path::PathBuf;

use super::types::Config;

/// Application state
///
/// Built once at startup and handed to the listener loop behind an `Arc`.
/// Nothing in here changes while the server runs.
pub struct AppState {
    pub config: Config,
    /// Directory files are served from
    pub root: PathBuf,
}

impl AppState {
    /// Create `AppState` for the given root.
    ///
    /// The root is not checked here; startup validates it, and request
    /// handling degrades to 404 when it is missing.
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self { config, root }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
