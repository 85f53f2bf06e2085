//! Saved session between invocations.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use log::warn;
use newsdesk_lib::auth::SessionToken;

/// A session token persisted as JSON.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the saved token.
    ///
    /// A missing, unreadable or expired session reads as `None`.
    pub fn load(&self) -> Option<SessionToken> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<SessionToken>(&contents) {
            Ok(token) if token.is_expired() => {
                debug!("saved session expired at {:?}", token.expires_at);
                None
            }
            Ok(token) => Some(token),
            Err(e) => {
                warn!("ignoring unreadable session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, token: &SessionToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Deletes the saved token. A missing file is not an error.
    pub fn delete(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("deleted session file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to delete {}: {}", self.path.display(), e),
        }
    }
}
