//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core
//! services, so no environment variables are read during request handling.

use crate::constants::SESSION_FILE_NAME;
use crate::{PortalError, PortalResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    state_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at the given state directory.
    ///
    /// The directory does not need to exist yet; it is created lazily when
    /// the session marker is first written.
    pub fn new(state_dir: PathBuf) -> PortalResult<Self> {
        if state_dir.as_os_str().is_empty() {
            return Err(PortalError::InvalidInput(
                "state_dir cannot be empty".into(),
            ));
        }
        Ok(Self { state_dir })
    }

    /// The directory holding the portal's only persisted state.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path of the persisted session marker file.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_file_lives_under_the_state_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/tmp/carelink")).expect("valid config");
        assert_eq!(
            cfg.session_file(),
            PathBuf::from("/tmp/carelink/session.json")
        );
    }

    #[test]
    fn empty_state_dir_is_rejected() {
        assert!(CoreConfig::new(PathBuf::new()).is_err());
    }
}
