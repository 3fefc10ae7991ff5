//! Data models for ledger accounts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_types::{Milligrams, TeamId, TimestampMs, UserId};

/// Ledger-internal account key.
///
/// Allocated sequentially by the store; ordering is used for two-account
/// lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of owner behind an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    User,
    Team,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::User => "user",
            OwnerType::Team => "team",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External reference to an account: the owner behind it.
///
/// Unique per account; the store keeps a 1:1 index from owner to
/// [`AccountId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub owner_type: OwnerType,
    pub owner_id: u64,
}

impl OwnerRef {
    pub fn user(user_id: UserId) -> Self {
        Self {
            owner_type: OwnerType::User,
            owner_id: user_id,
        }
    }

    pub fn team(team_id: TeamId) -> Self {
        Self {
            owner_type: OwnerType::Team,
            owner_id: team_id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner_type, self.owner_id)
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Frozen,
    Active,
}

/// Point-in-time view of one account.
///
/// Snapshots are detached copies; they never alias live store state.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub owner: OwnerRef,
    pub balance_mg: Milligrams,
    pub held_mg: Milligrams,
    pub status: AccountStatus,
    pub frozen_reason: Option<String>,
    pub created_at: TimestampMs,
}

impl Account {
    pub fn available_mg(&self) -> Milligrams {
        self.balance_mg.saturating_sub(self.held_mg)
    }

    pub fn is_frozen(&self) -> bool {
        self.status == AccountStatus::Frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_ref_display() {
        assert_eq!(OwnerRef::user(42).to_string(), "user:42");
        assert_eq!(OwnerRef::team(7).to_string(), "team:7");
    }

    #[test]
    fn test_owner_refs_distinct_across_types() {
        // Same numeric id, different owner kind: different accounts
        assert_ne!(OwnerRef::user(1), OwnerRef::team(1));
    }

    #[test]
    fn test_available() {
        let account = Account {
            id: AccountId(1),
            owner: OwnerRef::user(1),
            balance_mg: 1000,
            held_mg: 400,
            status: AccountStatus::Active,
            frozen_reason: None,
            created_at: 0,
        };

        assert_eq!(account.available_mg(), 600);
        assert!(!account.is_frozen());
    }
}
