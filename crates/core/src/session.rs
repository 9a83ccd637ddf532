//! Session state machine and the persisted session marker.
//!
//! Responsibilities:
//! - Define the session snapshot consumed by the routing boundary
//! - Reduce login/logout actions over it (pure transition function)
//! - Verify demo credentials against the user directory
//! - Persist and restore the session marker, the portal's only durable state
//!
//! The credential check is demo-grade on purpose: every seeded account
//! shares one hardcoded password. `verify_credentials` is the seam where a
//! real credential service would slot in. The simulated transport delay is
//! *not* here; it belongs to the API boundary, where dropping the pending
//! future cancels the check.

use crate::constants::DEMO_PASSWORD;
use crate::error::{PortalError, PortalResult};
use crate::messaging::User;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// State machine
// ============================================================================

/// Snapshot of the authentication state.
///
/// The routing boundary gates protected views on `is_authenticated` alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// The unauthenticated initial state.
    pub fn initial() -> Self {
        Self::default()
    }
}

/// An action dispatched against the session state.
#[derive(Clone, Debug)]
pub enum SessionAction {
    /// A login attempt started; shows the spinner and clears a prior error.
    LoginStart,
    /// Credentials checked out; the session becomes authenticated.
    LoginSuccess(User),
    /// The login attempt failed with a user-visible message.
    LoginFailure(String),
    /// Unconditional return to the initial state, discarding any error.
    Logout,
}

/// Applies one action to a session snapshot, returning the next snapshot.
///
/// Pure: the previous state is untouched, and the same inputs always yield
/// the same output.
pub fn reduce(state: &SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::LoginStart => SessionState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        SessionAction::LoginSuccess(user) => SessionState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        SessionAction::LoginFailure(message) => SessionState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(message),
        },
        SessionAction::Logout => SessionState::initial(),
    }
}

// ============================================================================
// Credential verification (demo-grade)
// ============================================================================

/// Checks an email/password pair against the user directory.
///
/// Succeeds only when a user with that exact email exists and the password
/// equals the shared demo literal. The error is the same for an unknown
/// email and a wrong password, so the message never leaks which one failed.
///
/// # Errors
///
/// Returns [`PortalError::InvalidCredentials`] on any mismatch.
pub fn verify_credentials<'a>(
    users: &'a [User],
    email: &str,
    password: &str,
) -> PortalResult<&'a User> {
    let user = users.iter().find(|u| u.email == email);
    match user {
        Some(user) if password == DEMO_PASSWORD => Ok(user),
        _ => Err(PortalError::InvalidCredentials),
    }
}

// ============================================================================
// Persisted session marker
// ============================================================================

/// The serialized user record persisted across restarts.
///
/// On successful login the user is written here; on startup it is read back
/// to restore the session without re-authenticating; on logout it is
/// deleted. There is no schema versioning; a marker that fails to parse is
/// removed and ignored.
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Creates a marker handle for the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Persists the logged-in user, creating the state directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`PortalError`] when the directory cannot be created or the
    /// marker cannot be serialized or written.
    pub fn save(&self, user: &User) -> PortalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(PortalError::SessionDirCreation)?;
        }
        let json = serde_json::to_string_pretty(user).map_err(PortalError::SessionSerialization)?;
        fs::write(&self.path, json).map_err(PortalError::SessionWrite)
    }

    /// Restores the persisted user, if a valid marker exists.
    ///
    /// A missing marker yields `None`. A marker that cannot be read or
    /// parsed also yields `None`: it is logged, removed and otherwise
    /// ignored, so startup proceeds unauthenticated.
    pub fn load(&self) -> Option<User> {
        if !self.path.exists() {
            return None;
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("failed to read session marker: {e}");
                return None;
            }
        };
        match serde_json::from_str::<User>(&contents) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("discarding corrupt session marker: {e}");
                if let Err(e) = fs::remove_file(&self.path) {
                    tracing::warn!("failed to remove corrupt session marker: {e}");
                }
                None
            }
        }
    }

    /// Deletes the marker. A marker that never existed is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::SessionClear`] when the file exists but cannot
    /// be removed.
    pub fn clear(&self) -> PortalResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortalError::SessionClear(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::messaging::UserRole;

    fn demo_user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Dr. Sarah Johnson".into(),
            email: "sarah.johnson@carelink.health".into(),
            role: UserRole::Clinician,
            avatar: None,
        }
    }

    #[test]
    fn login_start_sets_loading_and_clears_error() {
        let errored = SessionState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some("old failure".into()),
        };
        let next = reduce(&errored, SessionAction::LoginStart);
        assert!(next.is_loading);
        assert_eq!(next.error, None);
        assert!(!next.is_authenticated);
    }

    #[test]
    fn login_success_authenticates_and_stores_the_user() {
        let loading = reduce(&SessionState::initial(), SessionAction::LoginStart);
        let next = reduce(&loading, SessionAction::LoginSuccess(demo_user()));
        assert!(next.is_authenticated);
        assert!(!next.is_loading);
        assert_eq!(next.error, None);
        assert_eq!(next.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn login_failure_shape_matches_the_contract() {
        let loading = reduce(&SessionState::initial(), SessionAction::LoginStart);
        let next = reduce(&loading, SessionAction::LoginFailure("x".into()));
        assert_eq!(
            next,
            SessionState {
                user: None,
                is_authenticated: false,
                is_loading: false,
                error: Some("x".into()),
            }
        );
    }

    #[test]
    fn logout_restores_the_exact_initial_state() {
        let authenticated = reduce(
            &SessionState::initial(),
            SessionAction::LoginSuccess(demo_user()),
        );
        assert_eq!(
            reduce(&authenticated, SessionAction::Logout),
            SessionState::initial()
        );

        // Logout also discards a pending error unconditionally.
        let failed = reduce(
            &SessionState::initial(),
            SessionAction::LoginFailure("x".into()),
        );
        assert_eq!(reduce(&failed, SessionAction::Logout), SessionState::initial());
    }

    #[test]
    fn verify_credentials_accepts_the_demo_password_only() {
        let users = vec![demo_user()];
        let user = verify_credentials(&users, "sarah.johnson@carelink.health", "password")
            .expect("demo credentials are valid");
        assert_eq!(user.id.as_str(), "u1");

        assert!(matches!(
            verify_credentials(&users, "sarah.johnson@carelink.health", "hunter2"),
            Err(PortalError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_credentials(&users, "nobody@carelink.health", "password"),
            Err(PortalError::InvalidCredentials)
        ));
    }

    #[test]
    fn session_marker_round_trips() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let marker = SessionFile::new(dir.path().join("session.json"));

        assert!(marker.load().is_none());

        marker.save(&demo_user()).expect("save marker");
        let restored = marker.load().expect("marker restores the user");
        assert_eq!(restored, demo_user());

        marker.clear().expect("clear marker");
        assert!(marker.load().is_none());
        // Clearing twice is fine.
        marker.clear().expect("second clear is a no-op");
    }

    #[test]
    fn corrupt_marker_is_removed_and_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").expect("write corrupt marker");

        let marker = SessionFile::new(path.clone());
        assert!(marker.load().is_none());
        assert!(!path.exists(), "corrupt marker should be deleted");
    }

    #[test]
    fn save_creates_the_state_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let marker = SessionFile::new(dir.path().join("nested/state/session.json"));
        marker.save(&demo_user()).expect("save creates parents");
        assert!(marker.load().is_some());
    }
}
