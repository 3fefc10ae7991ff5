//! Transfer lifecycle states
//!
//! A transfer starts pending and leaves pending exactly once. State IDs
//! are stable SMALLINT-sized codes for snapshots and audit exports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transfer lifecycle states
///
/// `Pending` is the only non-terminal state. The four terminal states are
/// permanent: once a transfer leaves `Pending` no further transition is
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum TransferStatus {
    /// Funds held in escrow, waiting for the recipient's decision
    Pending = 0,

    /// Terminal: recipient confirmed, held funds settled to destination
    Confirmed = 10,

    /// Terminal: recipient declined, held funds released to sender
    Rejected = 20,

    /// Terminal: expiry passed without a decision, held funds released
    Expired = 30,

    /// Terminal: sender withdrew before confirmation, held funds released
    Cancelled = 40,
}

impl TransferStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }

    /// Get the numeric state ID for storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from a stored state ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TransferStatus::Pending),
            10 => Some(TransferStatus::Confirmed),
            20 => Some(TransferStatus::Rejected),
            30 => Some(TransferStatus::Expired),
            40 => Some(TransferStatus::Cancelled),
            _ => None,
        }
    }

    /// Get the wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Confirmed => "confirmed",
            TransferStatus::Rejected => "rejected",
            TransferStatus::Expired => "expired",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TransferStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TransferStatus::from_id(value).ok_or(())
    }
}
