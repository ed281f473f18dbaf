//! Session tokens.
//!
//! A successful login issues an opaque token. API surfaces resolve the token on every
//! request and hand the resulting [`PatientIdentity`] to the core; the core itself never
//! sees tokens.

use clinic_core::{EmailAddress, PatientIdentity};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// In-process map of live session tokens to patient emails.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, EmailAddress>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `email` and returns its token.
    pub fn issue(&self, email: EmailAddress) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tracing::debug!("session started for {}", email);
        sessions.insert(token.clone(), email);
        token
    }

    /// Resolves `token` to the identity it was issued for.
    pub fn resolve(&self, token: &str) -> Option<PatientIdentity> {
        let sessions = match self.sessions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.get(token).cloned().map(PatientIdentity::new)
    }

    /// Ends the session. Returns `false` if the token was not live.
    pub fn revoke(&self, token: &str) -> bool {
        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_resolve_revoke() {
        let registry = SessionRegistry::new();
        let email = EmailAddress::parse("p@x.com").unwrap();

        let token = registry.issue(email.clone());
        assert_eq!(registry.resolve(&token).unwrap().email(), &email);

        assert!(registry.revoke(&token));
        assert!(registry.resolve(&token).is_none());
        assert!(!registry.revoke(&token));
    }

    #[test]
    fn test_tokens_are_distinct_per_login() {
        let registry = SessionRegistry::new();
        let email = EmailAddress::parse("p@x.com").unwrap();
        let a = registry.issue(email.clone());
        let b = registry.issue(email);
        assert_ne!(a, b);
        assert!(registry.resolve("not-a-token").is_none());
    }
}
