use crate::core_auth::helper::verify_password;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

fn default_password_required() -> bool {
    true
}

/// A user allowed to log in to the fake server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    /// Clear text, or a bcrypt hash (`$2a$`, `$2b$`, `$2y$`).
    #[serde(default)]
    pub password: String,
    pub home_directory: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default = "default_password_required")]
    pub password_required: bool,
}

impl UserAccount {
    pub fn new(username: &str, password: &str, home_directory: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            home_directory: home_directory.to_string(),
            groups: Vec::new(),
            password_required: true,
        }
    }

    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn without_password(mut self) -> Self {
        self.password_required = false;
        self
    }

    pub fn is_valid_password(&self, password: &str) -> bool {
        if !self.password_required {
            return true;
        }
        if is_bcrypt_hash(&self.password) {
            verify_password(password, &self.password)
        } else {
            self.password == password
        }
    }
}

fn is_bcrypt_hash(value: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// Source of user accounts for the login handlers.
pub trait AccountStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<UserAccount>;
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.add(account);
        }
        store
    }

    /// Adds or replaces the account with the same username.
    pub fn add(&self, account: UserAccount) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.username.clone(), account);
    }
}

impl AccountStore for InMemoryAccountStore {
    fn lookup(&self, username: &str) -> Option<UserAccount> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
    }
}
