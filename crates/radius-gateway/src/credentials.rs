//! Read-only credential lookup for the Access handler

use std::collections::HashMap;

/// Username to cleartext password lookup.
///
/// Implementations are built once at startup and shared between listener
/// tasks, so lookups must not mutate state.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<&str>;
}

/// Fixed in-memory credential set
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<U, P> FromIterator<(U, P)> for StaticCredentials
where
    U: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (U, P)>>(iter: I) -> Self {
        StaticCredentials {
            users: iter
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }
}

impl CredentialStore for StaticCredentials {
    fn lookup(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }
}
