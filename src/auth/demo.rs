use crate::core::{Result, StoreError};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEMO_USERNAME: &str = "admin";
pub const DEFAULT_DEMO_PASSWORD: &str = "admin123";

/// bcrypt's minimum cost; the built-in demo account guards nothing real.
const DEMO_HASH_COST: u32 = 4;

lazy_static! {
    static ref DEFAULT_DEMO_HASH: Option<String> =
        bcrypt::hash(DEFAULT_DEMO_PASSWORD, DEMO_HASH_COST).ok();
}

/// Locally checked credentials for the demo session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoAccount {
    pub username: String,
    /// bcrypt hash; `None` means the built-in default password
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl Default for DemoAccount {
    fn default() -> Self {
        Self {
            username: DEFAULT_DEMO_USERNAME.to_string(),
            password_hash: None,
        }
    }
}

impl DemoAccount {
    /// Account with a freshly hashed password
    pub fn with_password(username: &str, password: &str, cost: u32) -> Result<Self> {
        let hash = bcrypt::hash(password, cost)
            .map_err(|e| StoreError::InvalidRecord(format!("Failed to hash password: {}", e)))?;
        Ok(Self {
            username: username.to_string(),
            password_hash: Some(hash),
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        let hash = match &self.password_hash {
            Some(hash) => hash.as_str(),
            None => match DEFAULT_DEMO_HASH.as_deref() {
                Some(hash) => hash,
                None => return false,
            },
        };
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_account() {
        let account = DemoAccount::default();
        assert!(account.verify("admin", "admin123"));
        assert!(!account.verify("admin", "wrong"));
        assert!(!account.verify("root", "admin123"));
    }

    #[test]
    fn test_custom_account() {
        let account = DemoAccount::with_password("owner", "rahasia", 4).unwrap();
        assert!(account.verify("owner", "rahasia"));
        assert!(!account.verify("owner", "admin123"));
    }
}
