//! Transfer core types
//!
//! Type definitions for the escrowed transfer lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::models::{AccountId, OwnerRef, OwnerType};
use crate::core_types::{Milligrams, TimestampMs};

use super::state::TransferStatus;

/// Transfer identifier - UUID v4
///
/// Generated once at creation, immutable, globally unique without
/// coordination. Callers retrying a failed request reuse the id they
/// were handed, never mint a second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(Uuid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Transfer direction, derived from the two endpoint owner kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum TransferType {
    UserToUser = 1,
    UserToTeam = 2,
    TeamToUser = 3,
    TeamToTeam = 4,
}

impl TransferType {
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransferType::UserToUser),
            2 => Some(TransferType::UserToTeam),
            3 => Some(TransferType::TeamToUser),
            4 => Some(TransferType::TeamToTeam),
            _ => None,
        }
    }

    /// Determine transfer type from the endpoint owner kinds
    pub fn between(from: OwnerType, to: OwnerType) -> Self {
        match (from, to) {
            (OwnerType::User, OwnerType::User) => TransferType::UserToUser,
            (OwnerType::User, OwnerType::Team) => TransferType::UserToTeam,
            (OwnerType::Team, OwnerType::User) => TransferType::TeamToUser,
            (OwnerType::Team, OwnerType::Team) => TransferType::TeamToTeam,
        }
    }

    /// Get the wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::UserToUser => "user_to_user",
            TransferType::UserToTeam => "user_to_team",
            TransferType::TeamToUser => "team_to_user",
            TransferType::TeamToTeam => "team_to_team",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer request from the calling application
///
/// The acting user is NOT part of the request; it arrives separately from
/// the authentication collaborator.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Source account owner
    pub from: OwnerRef,
    /// Destination account owner
    pub to: OwnerRef,
    /// Amount in milligrams, fixed at creation
    pub amount_mg: Milligrams,
    /// Free-form annotation, stored but never interpreted
    pub notes: Option<String>,
}

impl TransferRequest {
    pub fn new(from: OwnerRef, to: OwnerRef, amount_mg: Milligrams) -> Self {
        Self {
            from,
            to,
            amount_mg,
            notes: None,
        }
    }

    pub fn with_notes(from: OwnerRef, to: OwnerRef, amount_mg: Milligrams, notes: String) -> Self {
        Self {
            from,
            to,
            amount_mg,
            notes: Some(notes),
        }
    }
}

/// One value-movement attempt between two accounts.
///
/// Created pending, leaves pending exactly once, never deleted.
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Unique transfer ID, immutable
    pub id: TransferId,
    /// Direction tag; authorization and presentation branch on it,
    /// the escrow ledger does not
    pub transfer_type: TransferType,
    /// Source account
    pub from_account: AccountId,
    /// Destination account
    pub to_account: AccountId,
    /// Amount in milligrams, fixed at creation
    pub amount_mg: Milligrams,
    /// Current lifecycle state
    pub status: TransferStatus,
    /// Creation timestamp (millis)
    pub created_at: TimestampMs,
    /// Expiry deadline: `created_at` + configured TTL
    pub expires_at: TimestampMs,
    /// Set exactly once, on confirmation
    pub confirmed_at: Option<TimestampMs>,
    /// Free-form annotation
    pub notes: Option<String>,
}

impl Transfer {
    /// Create a new pending transfer
    #[allow(clippy::too_many_arguments)]
    pub fn pending(
        id: TransferId,
        transfer_type: TransferType,
        from_account: AccountId,
        to_account: AccountId,
        amount_mg: Milligrams,
        created_at: TimestampMs,
        expires_at: TimestampMs,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            transfer_type,
            from_account,
            to_account,
            amount_mg,
            status: TransferStatus::Pending,
            created_at,
            expires_at,
            confirmed_at: None,
            notes,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == TransferStatus::Pending
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} from={} to={} amount={}mg status={}",
            self.id, self.transfer_type, self.from_account, self.to_account, self.amount_mg, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_id_display_roundtrip() {
        let id = TransferId::new();
        let parsed: TransferId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_transfer_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<TransferId>().is_err());
    }

    #[test]
    fn test_transfer_type_between() {
        assert_eq!(
            TransferType::between(OwnerType::User, OwnerType::User),
            TransferType::UserToUser
        );
        assert_eq!(
            TransferType::between(OwnerType::User, OwnerType::Team),
            TransferType::UserToTeam
        );
        assert_eq!(
            TransferType::between(OwnerType::Team, OwnerType::User),
            TransferType::TeamToUser
        );
        assert_eq!(
            TransferType::between(OwnerType::Team, OwnerType::Team),
            TransferType::TeamToTeam
        );
    }

    #[test]
    fn test_transfer_type_id_roundtrip() {
        for ty in [
            TransferType::UserToUser,
            TransferType::UserToTeam,
            TransferType::TeamToUser,
            TransferType::TeamToTeam,
        ] {
            assert_eq!(TransferType::from_id(ty.id()), Some(ty));
        }
        assert_eq!(TransferType::from_id(0), None);
        assert_eq!(TransferType::from_id(5), None);
    }

    #[test]
    fn test_new_transfer_is_pending() {
        let transfer = Transfer::pending(
            TransferId::new(),
            TransferType::UserToUser,
            AccountId(1),
            AccountId(2),
            400,
            1_000,
            87_401_000,
            Some("thanks for the review".to_string()),
        );

        assert!(transfer.is_pending());
        assert_eq!(transfer.status, TransferStatus::Pending);
        assert!(transfer.confirmed_at.is_none());
        assert_eq!(transfer.expires_at, 87_401_000);
    }

    #[test]
    fn test_request_builders() {
        let req = TransferRequest::new(OwnerRef::user(1), OwnerRef::team(9), 250);
        assert!(req.notes.is_none());

        let req = TransferRequest::with_notes(
            OwnerRef::user(1),
            OwnerRef::team(9),
            250,
            "sprint bonus".to_string(),
        );
        assert_eq!(req.notes.as_deref(), Some("sprint bonus"));
    }
}
