//! The logged-in user, remembered between runs in a small JSON file.

use std::path::{Path, PathBuf};

use join_core::user::ActiveUser;
use serde::{Deserialize, Serialize};

/// Errors from reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The file could not be read or written.
    #[error("session file {path}: {source}")]
    Io {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a session record.
    #[error("corrupt session file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contents of the session file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// Who is logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_user: Option<ActiveUser>,
    /// Whether the greeting should be shown once more.
    #[serde(default)]
    pub show_mobile_greeting: bool,
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Storage at `path`; nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads the session. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(&self) -> Result<SessionData, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionData::default()),
            Err(e) => Err(self.io(e)),
        }
    }

    /// Writes the session, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be written.
    pub fn save(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json).map_err(|e| self.io(e))
    }

    /// Forgets the session. Clearing twice is fine.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io(e)),
        }
    }

    /// Remembers `user` and arms the one-time greeting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be written.
    pub fn log_in(&self, user: ActiveUser) -> Result<(), SessionError> {
        self.save(&SessionData {
            active_user: Some(user),
            show_mobile_greeting: true,
        })
    }

    /// Returns whether the greeting is due and disarms it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file cannot be read or rewritten.
    pub fn take_greeting(&self) -> Result<bool, SessionError> {
        let mut data = self.load()?;
        if !data.show_mobile_greeting {
            return Ok(false);
        }
        data.show_mobile_greeting = false;
        self.save(&data)?;
        Ok(true)
    }

    /// Replaces the remembered name and email after the user's own contact
    /// was edited. Does nothing when someone else is logged in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file cannot be read or rewritten.
    pub fn follow_rename(&self, old_email: &str, name: &str, email: &str) -> Result<bool, SessionError> {
        let mut data = self.load()?;
        let Some(user) = data.active_user.as_mut().filter(|u| u.email == old_email) else {
            return Ok(false);
        };
        user.name = name.to_string();
        user.email = email.to_string();
        user.initials = join_core::user::session_initials(name);
        self.save(&data)?;
        Ok(true)
    }
}
