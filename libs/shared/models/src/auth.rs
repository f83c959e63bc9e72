use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Consultant,
}

impl Role {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value.to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "consultant" => Ok(Role::Consultant),
            other => Err(ApiError::Auth(format!("unknown role: {}", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Consultant => write!(f, "consultant"),
        }
    }
}

/// An authenticated session against the platform API. Passed explicitly to
/// every protected client call; never held in a global.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub role: Role,
}

impl Session {
    pub fn new(access_token: impl Into<String>, role: Role) -> Self {
        Self {
            access_token: access_token.into(),
            role,
        }
    }

    pub fn member(access_token: impl Into<String>) -> Self {
        Self::new(access_token, Role::Member)
    }

    pub fn consultant(access_token: impl Into<String>) -> Self {
        Self::new(access_token, Role::Consultant)
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

/// Explicit owner of the current session. Login and logout are the only ways
/// to change it.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, session: Session) {
        self.current = Some(session);
    }

    pub fn logout(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn require(&self) -> Result<&Session, ApiError> {
        self.current
            .as_ref()
            .ok_or_else(|| ApiError::Auth("no active session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_then_logout_clears_session() {
        let mut manager = SessionManager::new();
        assert!(manager.current().is_none());

        manager.login(Session::member("token-1"));
        assert_eq!(manager.require().map(|s| s.role), Ok(Role::Member));

        manager.logout();
        assert!(manager.require().is_err());
    }

    #[test]
    fn role_parse_accepts_known_roles_only() {
        assert_eq!(Role::parse("consultant"), Ok(Role::Consultant));
        assert_eq!(Role::parse("MEMBER"), Ok(Role::Member));
        assert!(Role::parse("admin").is_err());
    }
}
