//! Transfer workflow
//!
//! Drives the transfer lifecycle end to end: create places the hold,
//! confirm settles it, reject and cancel release it, expiry releases it
//! on the clock's authority. Every status change is a check-and-set
//! under the transfer record lock.
//!
//! Lock discipline: authorization may await, so it runs with no locks
//! held; the record is then relocked and the status re-checked. Account
//! locks are only ever taken while holding a transfer record lock,
//! never the other way around.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use tracing::info;

use crate::account::{AccountStore, OwnerRef, OwnerType};
use crate::clock::Clock;
use crate::core_types::{TeamId, UserId};
use crate::error::LedgerError;
use crate::escrow::EscrowLedger;

use super::state::TransferStatus;
use super::store::TransferStore;
use super::types::{Transfer, TransferId, TransferRequest, TransferType};

// ============================================================================
// Membership
// ============================================================================

/// Answers whether a user may act for a team-owned account.
#[async_trait]
pub trait MembershipVerifier: Send + Sync {
    async fn is_active_member(&self, team_id: TeamId, user_id: UserId) -> bool;
}

/// In-memory membership table.
#[derive(Default)]
pub struct StaticMembership {
    members: DashSet<(TeamId, UserId)>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self {
            members: DashSet::new(),
        }
    }

    pub fn grant(&self, team_id: TeamId, user_id: UserId) {
        self.members.insert((team_id, user_id));
    }

    pub fn revoke(&self, team_id: TeamId, user_id: UserId) {
        self.members.remove(&(team_id, user_id));
    }
}

#[async_trait]
impl MembershipVerifier for StaticMembership {
    async fn is_active_member(&self, team_id: TeamId, user_id: UserId) -> bool {
        self.members.contains(&(team_id, user_id))
    }
}

// ============================================================================
// Workflow
// ============================================================================

pub struct TransferWorkflow {
    accounts: Arc<AccountStore>,
    transfers: Arc<TransferStore>,
    escrow: EscrowLedger,
    membership: Arc<dyn MembershipVerifier>,
    clock: Clock,
    ttl_ms: i64,
}

impl TransferWorkflow {
    pub fn new(
        accounts: Arc<AccountStore>,
        transfers: Arc<TransferStore>,
        membership: Arc<dyn MembershipVerifier>,
        clock: Clock,
        ttl: Duration,
    ) -> Self {
        Self {
            escrow: EscrowLedger::new(Arc::clone(&accounts)),
            accounts,
            transfers,
            membership,
            clock,
            ttl_ms: ttl.as_millis() as i64,
        }
    }

    /// Create a pending transfer: place the hold, record the deadline.
    ///
    /// The actor must control the source account. No value reaches the
    /// destination until the recipient confirms.
    pub async fn create(
        &self,
        actor: UserId,
        request: TransferRequest,
    ) -> Result<Transfer, LedgerError> {
        if request.amount_mg == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if request.from == request.to {
            return Err(LedgerError::SameAccount);
        }
        let from_account = self.accounts.resolve(request.from)?;
        let to_account = self.accounts.resolve(request.to)?;
        self.authorize(actor, request.from).await?;

        let transfer_type = TransferType::between(request.from.owner_type, request.to.owner_type);

        self.escrow.hold(from_account, request.amount_mg)?;

        let now = self.clock.now();
        let transfer = Transfer::pending(
            TransferId::new(),
            transfer_type,
            from_account,
            to_account,
            request.amount_mg,
            now,
            now + self.ttl_ms,
            request.notes,
        );
        self.transfers.insert(transfer.clone());
        info!(
            transfer = %transfer.id,
            from = %request.from,
            to = %request.to,
            amount_mg = request.amount_mg,
            expires_at = transfer.expires_at,
            "Transfer created"
        );
        Ok(transfer)
    }

    /// Confirm a pending transfer: settle the held funds into the
    /// destination account.
    ///
    /// Only the recipient side may confirm. A confirmation that arrives
    /// past the deadline expires the transfer in place, releasing the
    /// hold, and reports `Expired`.
    pub async fn confirm(&self, actor: UserId, id: TransferId) -> Result<Transfer, LedgerError> {
        let record = self.transfers.record(id)?;
        let to_account = {
            let guard = TransferStore::lock(&record)?;
            guard.to_account
        };
        let to_owner = self.accounts.get_by_id(to_account)?.owner;
        self.authorize(actor, to_owner).await?;

        let mut guard = TransferStore::lock(&record)?;
        if guard.status != TransferStatus::Pending {
            return Err(LedgerError::AlreadyTerminal(guard.status.to_string()));
        }
        let now = self.clock.now();
        if now > guard.expires_at {
            self.expire_locked(&mut guard)?;
            return Err(LedgerError::Expired);
        }

        self.escrow
            .settle(guard.from_account, guard.to_account, guard.amount_mg)?;
        guard.status = TransferStatus::Confirmed;
        guard.confirmed_at = Some(now);
        info!(
            transfer = %guard.id,
            amount_mg = guard.amount_mg,
            "Transfer confirmed"
        );
        Ok(guard.clone())
    }

    /// Reject a pending transfer: release the hold back to the sender.
    ///
    /// Only the recipient side may reject. Past the deadline an overdue
    /// transfer the sweeper has not reached yet is expired here instead,
    /// so the recipient-facing verdict on a stale offer is always
    /// `Expired` no matter who touches it first.
    pub async fn reject(&self, actor: UserId, id: TransferId) -> Result<Transfer, LedgerError> {
        let record = self.transfers.record(id)?;
        let to_account = {
            let guard = TransferStore::lock(&record)?;
            guard.to_account
        };
        let to_owner = self.accounts.get_by_id(to_account)?.owner;
        self.authorize(actor, to_owner).await?;

        let mut guard = TransferStore::lock(&record)?;
        if guard.status != TransferStatus::Pending {
            return Err(LedgerError::AlreadyTerminal(guard.status.to_string()));
        }
        if self.clock.now() > guard.expires_at {
            self.expire_locked(&mut guard)?;
            return Err(LedgerError::Expired);
        }
        self.escrow.release(guard.from_account, guard.amount_mg)?;
        guard.status = TransferStatus::Rejected;
        info!(transfer = %guard.id, "Transfer rejected");
        Ok(guard.clone())
    }

    /// Cancel a pending transfer: the sender takes the offer back.
    ///
    /// Only the source side may cancel, and only while still pending.
    pub async fn cancel(&self, actor: UserId, id: TransferId) -> Result<Transfer, LedgerError> {
        let record = self.transfers.record(id)?;
        let from_account = {
            let guard = TransferStore::lock(&record)?;
            guard.from_account
        };
        let from_owner = self.accounts.get_by_id(from_account)?.owner;
        self.authorize(actor, from_owner).await?;

        let mut guard = TransferStore::lock(&record)?;
        if guard.status != TransferStatus::Pending {
            return Err(LedgerError::AlreadyTerminal(guard.status.to_string()));
        }
        self.escrow.release(guard.from_account, guard.amount_mg)?;
        guard.status = TransferStatus::Cancelled;
        info!(transfer = %guard.id, "Transfer cancelled");
        Ok(guard.clone())
    }

    /// Expire one overdue transfer on the clock's authority.
    ///
    /// Returns `Ok(false)` when another path reached the record first or
    /// the deadline has not actually passed. The sweeper calls this for
    /// every candidate it scans up.
    pub fn expire_overdue(&self, id: TransferId) -> Result<bool, LedgerError> {
        let record = self.transfers.record(id)?;
        let mut guard = TransferStore::lock(&record)?;
        if guard.status != TransferStatus::Pending {
            return Ok(false);
        }
        if self.clock.now() < guard.expires_at {
            return Ok(false);
        }
        self.expire_locked(&mut guard)?;
        Ok(true)
    }

    /// Release the hold and mark the record expired. Caller holds the
    /// record lock and has verified the status is still pending.
    fn expire_locked(&self, transfer: &mut Transfer) -> Result<(), LedgerError> {
        self.escrow
            .release(transfer.from_account, transfer.amount_mg)?;
        transfer.status = TransferStatus::Expired;
        info!(
            transfer = %transfer.id,
            amount_mg = transfer.amount_mg,
            "Transfer expired, hold released"
        );
        Ok(())
    }

    async fn authorize(&self, actor: UserId, owner: OwnerRef) -> Result<(), LedgerError> {
        let allowed = match owner.owner_type {
            OwnerType::User => owner.owner_id == actor,
            OwnerType::Team => self.membership.is_active_member(owner.owner_id, actor).await,
        };
        if allowed {
            Ok(())
        } else {
            Err(LedgerError::NotAuthorized)
        }
    }
}
