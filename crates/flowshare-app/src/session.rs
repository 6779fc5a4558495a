//! Signed-in user state
//!
//! The session is an explicit value owned by the caller: hydrated from disk on
//! load, written on login, removed on logout.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flowshare_domain::model::UserRole;
use flowshare_domain::service::{normalize_email, validate, EMAIL_RULES};
use flowshare_types::{Error, Result};

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub tenant_id: String,
    #[serde(default)]
    pub role: UserRole,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    user: Option<SessionUser>,
}

impl Session {
    /// `<config_dir>/flowshare/session.json`
    pub fn default_path() -> Result<PathBuf> {
        Ok(Config::config_dir()?.join("session.json"))
    }

    /// Load the persisted session at `path`, or start signed out
    pub fn hydrate(path: PathBuf) -> Result<Self> {
        let user = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let user: SessionUser = serde_json::from_str(&content)
                .map_err(|e| Error::Session(format!("corrupt session file: {}", e)))?;
            debug!(email = %user.email, "session hydrated");
            Some(user)
        } else {
            None
        };
        Ok(Self { path, user })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Record a signed-in user. The email is validated and normalized.
    pub fn login(
        &mut self,
        email: &str,
        tenant_id: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<&SessionUser> {
        let email = normalize_email(email);
        let problems = validate(&email, EMAIL_RULES);
        if !problems.is_empty() {
            return Err(Error::Session(problems.join("; ")));
        }
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(Error::Session("tenant is required".to_string()));
        }

        let user = SessionUser {
            email,
            tenant_id: tenant_id.to_string(),
            role,
            logged_in_at: now,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&user)?)?;
        info!(email = %user.email, tenant = %user.tenant_id, "logged in");

        Ok(self.user.insert(user))
    }

    /// Forget the user and remove the session file
    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_hydrate_logout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowshare").join("session.json");

        let mut session = Session::hydrate(path.clone()).unwrap();
        assert!(!session.is_authenticated());

        let user = session
            .login("  Ops@Example.COM ", "tenant-a", UserRole::FieldOperator, Utc::now())
            .unwrap();
        assert_eq!(user.email, "ops@example.com");

        let restored = Session::hydrate(path.clone()).unwrap();
        assert_eq!(restored.user().unwrap().tenant_id, "tenant-a");
        assert_eq!(restored.user().unwrap().role, UserRole::FieldOperator);

        session.logout().unwrap();
        assert!(!path.exists());
        assert!(!Session::hydrate(path).unwrap().is_authenticated());
    }

    #[test]
    fn test_login_rejects_bad_email_and_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::hydrate(dir.path().join("session.json")).unwrap();
        let err = session
            .login("not-an-email", "t", UserRole::Coordinator, Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("Must be a valid email address"));
        assert!(session
            .login("a@b.com", " ", UserRole::Coordinator, Utc::now())
            .is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[]").unwrap();
        assert!(matches!(Session::hydrate(path), Err(Error::Session(_))));
    }
}
