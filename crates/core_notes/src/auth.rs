use core_types::{CredentialVerifier, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl CredentialVerifier for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[derive(Debug)]
pub struct AuthGate<V = FixedCredentials> {
    verifier: V,
    authenticated: bool,
}

impl<V: CredentialVerifier> AuthGate<V> {
    pub fn new(verifier: V) -> Self {
        Self {
            verifier,
            authenticated: false,
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.verifier.verify(username, password) {
            self.authenticated = true;
            info!(username, "login succeeded");
            Ok(())
        } else {
            warn!(username, "login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_fixed_pair() {
        let credentials = FixedCredentials::default();
        assert!(credentials.verify("User", "user"));
        assert!(!credentials.verify("user", "user"));
        assert!(!credentials.verify("User", "User"));
        assert!(!credentials.verify("User ", "user"));
        assert!(!credentials.verify("", ""));
    }

    #[test]
    fn failed_login_leaves_gate_closed() {
        let mut gate = AuthGate::new(FixedCredentials::default());
        assert_eq!(
            gate.login("admin", "admin"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(!gate.is_authenticated());

        gate.login("User", "user").expect("login");
        assert!(gate.is_authenticated());
        gate.logout();
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn verifier_is_pluggable() {
        struct AllowAll;

        impl CredentialVerifier for AllowAll {
            fn verify(&self, _username: &str, _password: &str) -> bool {
                true
            }
        }

        let mut gate = AuthGate::new(AllowAll);
        gate.login("anyone", "anything").expect("login");
        assert!(gate.is_authenticated());
    }
}
