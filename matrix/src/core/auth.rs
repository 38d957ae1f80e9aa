//! One-time forced authentication state.

use serde::{Deserialize, Serialize};

/// Whether forced auth has already run during this process.
///
/// Transitions `NotAuthenticated -> Authenticated` exactly once and never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    NotAuthenticated,
    Authenticated,
}

impl AuthState {
    pub fn needs_auth(self) -> bool {
        self == AuthState::NotAuthenticated
    }

    /// Record that auth was attempted. Returns `true` only for the first call.
    ///
    /// The outcome of the attempt is irrelevant: a failed auth is not retried.
    pub fn mark_attempted(&mut self) -> bool {
        let transitioned = self.needs_auth();
        *self = AuthState::Authenticated;
        transitioned
    }
}
