//! Read-side queries
//!
//! Presentation views over the account and transfer stores. Every
//! summary in one page is derived against a single clock reading, so a
//! page is internally consistent even while the stores keep moving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountStatus, AccountStore, OwnerRef, OwnerType};
use crate::clock::Clock;
use crate::core_types::{Milligrams, TimestampMs};
use crate::error::LedgerError;
use crate::transfer::state::TransferStatus;
use crate::transfer::store::TransferStore;
use crate::transfer::types::{Transfer, TransferId, TransferType};

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Page selector from the calling application
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Out-of-range values are clamped, not rejected.
    fn normalized(self) -> (usize, usize) {
        let page = self.page.max(1);
        let limit = match self.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        };
        (page, limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

/// Transfer as shown to a viewer, with presentation flags derived at
/// query time. Flags are hints; the workflow re-checks everything.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub uuid: TransferId,
    pub transfer_type: TransferType,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount_milligrams: Milligrams,
    pub status: TransferStatus,
    pub created_at: TimestampMs,
    pub expires_at: TimestampMs,
    pub confirmed_at: Option<TimestampMs>,
    pub notes: Option<String>,
    /// Pending but past its deadline; the sweeper has not reached it yet
    pub is_expired: bool,
    /// Pending with less than the configured warning window left
    pub is_near_expiry: bool,
    /// Pending and still inside its deadline
    pub can_confirm: bool,
}

impl TransferSummary {
    fn derive(transfer: Transfer, now: TimestampMs, near_expiry_ms: i64) -> Self {
        let pending = transfer.status == TransferStatus::Pending;
        let is_expired = pending && now > transfer.expires_at;
        let is_near_expiry =
            pending && !is_expired && transfer.expires_at - now < near_expiry_ms;
        let can_confirm = pending && now <= transfer.expires_at;
        Self {
            uuid: transfer.id,
            transfer_type: transfer.transfer_type,
            from_account_id: transfer.from_account,
            to_account_id: transfer.to_account,
            amount_milligrams: transfer.amount_mg,
            status: transfer.status,
            created_at: transfer.created_at,
            expires_at: transfer.expires_at,
            confirmed_at: transfer.confirmed_at,
            notes: transfer.notes,
            is_expired,
            is_near_expiry,
            can_confirm,
        }
    }
}

/// Account as shown to its owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub owner_type: OwnerType,
    pub owner_id: u64,
    pub balance_milligrams: Milligrams,
    pub held_milligrams: Milligrams,
    pub available_milligrams: Milligrams,
    pub status: AccountStatus,
    pub frozen_reason: Option<String>,
    pub created_at: TimestampMs,
}

pub struct QueryFacade {
    accounts: Arc<AccountStore>,
    transfers: Arc<TransferStore>,
    clock: Clock,
    near_expiry_ms: i64,
}

impl QueryFacade {
    pub fn new(
        accounts: Arc<AccountStore>,
        transfers: Arc<TransferStore>,
        clock: Clock,
        near_expiry_ms: i64,
    ) -> Self {
        Self {
            accounts,
            transfers,
            clock,
            near_expiry_ms,
        }
    }

    /// Pending transfers addressed to the owner's account, newest first.
    pub fn pending_incoming(
        &self,
        owner: OwnerRef,
        page: PageRequest,
    ) -> Result<Page<TransferSummary>, LedgerError> {
        let account = self.accounts.resolve(owner)?;
        Ok(self.page_of(self.transfers.pending_incoming(account), page))
    }

    /// Terminal transfers touching the owner's account, either
    /// direction, newest first.
    pub fn completed(
        &self,
        owner: OwnerRef,
        page: PageRequest,
    ) -> Result<Page<TransferSummary>, LedgerError> {
        let account = self.accounts.resolve(owner)?;
        Ok(self.page_of(self.transfers.completed_for(account), page))
    }

    /// Wire view of a single transfer, e.g. the result of a workflow
    /// call, derived against the facade's clock and near-expiry window.
    pub fn summarize(&self, transfer: &Transfer) -> TransferSummary {
        TransferSummary::derive(transfer.clone(), self.clock.now(), self.near_expiry_ms)
    }

    /// Balance view of the owner's account.
    pub fn account_summary(&self, owner: OwnerRef) -> Result<AccountSummary, LedgerError> {
        let account = self.accounts.get(owner)?;
        Ok(AccountSummary {
            account_id: account.id,
            owner_type: account.owner.owner_type,
            owner_id: account.owner.owner_id,
            balance_milligrams: account.balance_mg,
            held_milligrams: account.held_mg,
            available_milligrams: account.available_mg(),
            status: account.status,
            frozen_reason: account.frozen_reason,
            created_at: account.created_at,
        })
    }

    fn page_of(&self, mut transfers: Vec<Transfer>, page: PageRequest) -> Page<TransferSummary> {
        // Newest first; uuid breaks creation-time ties so paging is stable
        transfers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        let (page_number, limit) = page.normalized();
        let total = transfers.len();
        let start = (page_number - 1).saturating_mul(limit);
        let now = self.clock.now();
        let items = transfers
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|transfer| TransferSummary::derive(transfer, now, self.near_expiry_ms))
            .collect();

        Page {
            items,
            page: page_number,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::transfer::types::TransferRequest;
    use crate::transfer::workflow::{MembershipVerifier, StaticMembership, TransferWorkflow};
    use std::time::Duration;

    const TTL_MS: i64 = 3_600_000;
    const NEAR_MS: i64 = 600_000;

    struct Harness {
        accounts: Arc<AccountStore>,
        clock: ManualClock,
        workflow: TransferWorkflow,
        queries: QueryFacade,
    }

    fn harness() -> Harness {
        let clock = ManualClock::new(1_000_000);
        let accounts = Arc::new(AccountStore::new(clock.clock()));
        let transfers = Arc::new(TransferStore::new());
        let membership = Arc::new(StaticMembership::new()) as Arc<dyn MembershipVerifier>;
        let workflow = TransferWorkflow::new(
            Arc::clone(&accounts),
            Arc::clone(&transfers),
            membership,
            clock.clock(),
            Duration::from_secs(3600),
        );
        let queries = QueryFacade::new(
            Arc::clone(&accounts),
            Arc::clone(&transfers),
            clock.clock(),
            NEAR_MS,
        );
        Harness {
            accounts,
            clock,
            workflow,
            queries,
        }
    }

    impl Harness {
        fn fund(&self, owner: OwnerRef, amount_mg: u64) {
            let account = self.accounts.open(owner).unwrap();
            if amount_mg > 0 {
                self.accounts.credit(account.id, amount_mg).unwrap();
            }
        }

        async fn send(&self, from: u64, to: u64, amount_mg: u64) -> TransferId {
            self.workflow
                .create(
                    from,
                    TransferRequest::new(OwnerRef::user(from), OwnerRef::user(to), amount_mg),
                )
                .await
                .map(|t| t.id)
                .unwrap()
        }
    }

    #[test]
    fn test_page_request_normalization() {
        assert_eq!(PageRequest::new(0, 0).normalized(), (1, DEFAULT_PAGE_LIMIT));
        assert_eq!(PageRequest::new(3, 50).normalized(), (3, 50));
        assert_eq!(PageRequest::new(1, 500).normalized(), (1, MAX_PAGE_LIMIT));
        assert_eq!(PageRequest::default().normalized(), (1, DEFAULT_PAGE_LIMIT));
    }

    #[tokio::test]
    async fn test_pending_incoming_newest_first() {
        let h = harness();
        h.fund(OwnerRef::user(1), 10_000);
        h.fund(OwnerRef::user(2), 0);

        let first = h.send(1, 2, 100).await;
        h.clock.advance(1_000);
        let second = h.send(1, 2, 200).await;

        let page = h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::default())
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].uuid, second);
        assert_eq!(page.items[1].uuid, first);
        assert!(page.items.iter().all(|s| s.can_confirm));
    }

    #[tokio::test]
    async fn test_pagination_windows() {
        let h = harness();
        h.fund(OwnerRef::user(1), 10_000);
        h.fund(OwnerRef::user(2), 0);
        for _ in 0..5 {
            h.send(1, 2, 100).await;
            h.clock.advance(10);
        }

        let page = h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::new(2, 2))
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);

        let past_end = h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::new(9, 2))
            .unwrap();
        assert_eq!(past_end.total, 5);
        assert!(past_end.items.is_empty());
    }

    #[tokio::test]
    async fn test_summary_flags_track_the_deadline() {
        let h = harness();
        h.fund(OwnerRef::user(1), 10_000);
        h.fund(OwnerRef::user(2), 0);
        h.send(1, 2, 100).await;

        let fresh = &h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::default())
            .unwrap()
            .items[0];
        assert!(fresh.can_confirm);
        assert!(!fresh.is_near_expiry);
        assert!(!fresh.is_expired);

        // Inside the warning window
        h.clock.advance(TTL_MS - NEAR_MS + 1);
        let closing = &h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::default())
            .unwrap()
            .items[0];
        assert!(closing.can_confirm);
        assert!(closing.is_near_expiry);
        assert!(!closing.is_expired);

        // Past the deadline, sweeper not yet run
        h.clock.set(1_000_000 + TTL_MS + 1);
        let overdue = &h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::default())
            .unwrap()
            .items[0];
        assert!(!overdue.can_confirm);
        assert!(!overdue.is_near_expiry);
        assert!(overdue.is_expired);
        assert_eq!(overdue.status, TransferStatus::Pending);
    }

    #[tokio::test]
    async fn test_summarize_workflow_result() {
        let h = harness();
        h.fund(OwnerRef::user(1), 1_000);
        h.fund(OwnerRef::user(2), 0);

        let transfer = h
            .workflow
            .create(
                1,
                TransferRequest::new(OwnerRef::user(1), OwnerRef::user(2), 400),
            )
            .await
            .unwrap();

        let summary = h.queries.summarize(&transfer);
        assert_eq!(summary.uuid, transfer.id);
        assert_eq!(summary.amount_milligrams, 400);
        assert!(summary.can_confirm);
        assert!(!summary.is_expired);
    }

    #[tokio::test]
    async fn test_completed_covers_both_directions() {
        let h = harness();
        h.fund(OwnerRef::user(1), 10_000);
        h.fund(OwnerRef::user(2), 1_000);
        h.fund(OwnerRef::user(3), 0);

        let sent = h.send(1, 2, 100).await;
        h.workflow.confirm(2, sent).await.unwrap();
        let received = h.send(2, 1, 50).await;
        h.workflow.reject(1, received).await.unwrap();
        // Unrelated traffic must not show up
        let other = h.send(1, 3, 25).await;
        h.workflow.confirm(3, other).await.unwrap();
        h.send(1, 2, 10).await;

        let page = h
            .queries
            .completed(OwnerRef::user(2), PageRequest::default())
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().any(|s| s.uuid == sent));
        assert!(page.items.iter().any(|s| s.uuid == received));
        assert!(page.items.iter().all(|s| !s.can_confirm));
    }

    #[tokio::test]
    async fn test_account_summary() {
        let h = harness();
        h.fund(OwnerRef::user(1), 1_000);
        h.fund(OwnerRef::user(2), 0);
        h.send(1, 2, 400).await;

        let summary = h.queries.account_summary(OwnerRef::user(1)).unwrap();
        assert_eq!(summary.balance_milligrams, 1_000);
        assert_eq!(summary.held_milligrams, 400);
        assert_eq!(summary.available_milligrams, 600);
        assert_eq!(summary.owner_type, OwnerType::User);
        assert_eq!(summary.owner_id, 1);
        assert!(summary.frozen_reason.is_none());

        assert!(matches!(
            h.queries.account_summary(OwnerRef::user(404)),
            Err(LedgerError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_summary_serializes_camel_case() {
        let h = harness();
        h.fund(OwnerRef::user(1), 1_000);
        h.fund(OwnerRef::user(2), 0);
        h.send(1, 2, 400).await;

        let page = h
            .queries
            .pending_incoming(OwnerRef::user(2), PageRequest::default())
            .unwrap();
        let json = serde_json::to_value(&page.items[0]).unwrap();
        assert_eq!(json["amountMilligrams"], 400);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["canConfirm"], true);
        assert!(json["confirmedAt"].is_null());
    }
}
