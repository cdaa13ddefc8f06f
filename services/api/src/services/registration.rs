//! services/api/src/services/registration.rs
//!
//! Account registration and listing. Registration validates the email shape,
//! runs an advisory existence check, and relies on the store's unique index
//! to settle concurrent duplicates.

use std::sync::Arc;

use chrono::Utc;
use classline_core::domain::{Account, AccountRole, AccountStatus, NewAccount};
use classline_core::ports::AccountStore;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{require_field, ServiceError};

// Exactly one "@" with non-whitespace on both sides and a "." somewhere in
// the domain part.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Clone)]
pub struct RegistrationService {
    accounts: Arc<dyn AccountStore>,
}

impl RegistrationService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Registers a new account with the role's default status.
    ///
    /// Teachers start out `pending`, students `active`. Two concurrent
    /// registrations for the same email may both pass the existence check;
    /// the store's duplicate-key rejection then decides the loser, surfaced
    /// here as a conflict.
    pub async fn register(
        &self,
        email: Option<String>,
        role: AccountRole,
    ) -> Result<Account, ServiceError> {
        let email = require_field("email", email)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ServiceError::Validation {
                field: "email",
                reason: "is not a valid email address".to_string(),
            });
        }

        if self.accounts.find_account_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "an account with this email already exists".to_string(),
            ));
        }

        let status = match role {
            AccountRole::Teacher => AccountStatus::Pending,
            AccountRole::Student => AccountStatus::Active,
        };

        let account = self
            .accounts
            .insert_account(NewAccount {
                email,
                role,
                status,
                created_at: Utc::now(),
            })
            .await?;

        Ok(account)
    }

    /// Lists all accounts of the given role, in store-native order.
    pub async fn list(&self, role: AccountRole) -> Result<Vec<Account>, ServiceError> {
        Ok(self.accounts.list_accounts(role).await?)
    }
}
