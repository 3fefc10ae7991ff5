//! Account store - the single balance authority
//!
//! Every account record lives behind its own lock inside a sharded map:
//! operations on the same account serialize, operations on disjoint
//! accounts proceed in parallel. Two-account settlement locks both
//! records in ascending id order, never the reverse.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use tracing::info;

use crate::balance::TeaBalance;
use crate::clock::Clock;
use crate::core_types::{Milligrams, MilligramsDelta, TimestampMs};
use crate::error::LedgerError;

use super::models::{Account, AccountId, AccountStatus, OwnerRef};

/// Live state of one account.
///
/// Guarded by its own mutex; snapshots leave the lock, the record never
/// does.
#[derive(Debug)]
struct AccountRecord {
    id: AccountId,
    owner: OwnerRef,
    balance: TeaBalance,
    status: AccountStatus,
    frozen_reason: Option<String>,
    created_at: TimestampMs,
}

impl AccountRecord {
    fn snapshot(&self) -> Account {
        Account {
            id: self.id,
            owner: self.owner,
            balance_mg: self.balance.balance(),
            held_mg: self.balance.held(),
            status: self.status,
            frozen_reason: self.frozen_reason.clone(),
            created_at: self.created_at,
        }
    }
}

/// Holder of all account balances, user and team alike.
///
/// Balance mutation goes through [`adjust`](AccountStore::adjust) and
/// [`adjust_pair`](AccountStore::adjust_pair) only; the escrow ledger is
/// the sole caller of those. `credit` is the one way new value enters.
pub struct AccountStore {
    accounts: DashMap<AccountId, Arc<Mutex<AccountRecord>>>,
    owner_index: DashMap<OwnerRef, AccountId>,
    next_id: AtomicU64,
    clock: Clock,
}

impl AccountStore {
    pub fn new(clock: Clock) -> Self {
        Self {
            accounts: DashMap::new(),
            owner_index: DashMap::new(),
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    /// Open an account for an owner, or return the existing one.
    pub fn open(&self, owner: OwnerRef) -> Result<Account, LedgerError> {
        let id = *self.owner_index.entry(owner).or_insert_with(|| {
            let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed));
            let record = AccountRecord {
                id,
                owner,
                balance: TeaBalance::default(),
                status: AccountStatus::Active,
                frozen_reason: None,
                created_at: self.clock.now(),
            };
            self.accounts.insert(id, Arc::new(Mutex::new(record)));
            info!(account = %id, owner = %owner, "Account opened");
            id
        });
        self.get_by_id(id)
    }

    /// Resolve an owner to its account id.
    pub fn resolve(&self, owner: OwnerRef) -> Result<AccountId, LedgerError> {
        self.owner_index
            .get(&owner)
            .map(|entry| *entry.value())
            .ok_or(LedgerError::AccountNotFound)
    }

    /// Snapshot an account by owner.
    pub fn get(&self, owner: OwnerRef) -> Result<Account, LedgerError> {
        let id = self.resolve(owner)?;
        self.get_by_id(id)
    }

    /// Snapshot an account by id.
    pub fn get_by_id(&self, id: AccountId) -> Result<Account, LedgerError> {
        let record = self.record(id)?;
        let guard = Self::lock_record(&record)?;
        Ok(guard.snapshot())
    }

    /// Credit inbound value to an account's settled balance.
    ///
    /// The only operation that grows the global balance sum. Frozen
    /// accounts can receive.
    pub fn credit(&self, id: AccountId, amount: Milligrams) -> Result<Account, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let record = self.record(id)?;
        let mut guard = Self::lock_record(&record)?;
        guard
            .balance
            .credit(amount)
            .map_err(|_| LedgerError::InvalidAmount)?;
        info!(
            account = %id,
            amount_mg = amount,
            balance_mg = guard.balance.balance(),
            "Account credited"
        );
        Ok(guard.snapshot())
    }

    /// Freeze an account: blocks new outgoing holds, keeps the receive
    /// and release paths open.
    pub fn freeze(&self, id: AccountId, reason: &str) -> Result<Account, LedgerError> {
        let record = self.record(id)?;
        let mut guard = Self::lock_record(&record)?;
        guard.status = AccountStatus::Frozen;
        guard.frozen_reason = Some(reason.to_string());
        info!(account = %id, reason = reason, "Account frozen");
        Ok(guard.snapshot())
    }

    /// Return a frozen account to active service.
    pub fn unfreeze(&self, id: AccountId) -> Result<Account, LedgerError> {
        let record = self.record(id)?;
        let mut guard = Self::lock_record(&record)?;
        guard.status = AccountStatus::Active;
        guard.frozen_reason = None;
        info!(account = %id, "Account unfrozen");
        Ok(guard.snapshot())
    }

    /// Atomically apply balance and held deltas to one account.
    ///
    /// Fails with `AccountFrozen` when a frozen account would take a new
    /// hold, `InsufficientFunds` when balance or available would go
    /// negative. On failure nothing changed.
    pub fn adjust(
        &self,
        id: AccountId,
        delta_balance: MilligramsDelta,
        delta_held: MilligramsDelta,
    ) -> Result<Account, LedgerError> {
        let record = self.record(id)?;
        let mut guard = Self::lock_record(&record)?;
        Self::check_frozen(&guard, delta_held)?;
        guard
            .balance
            .apply(delta_balance, delta_held)
            .map_err(|_| LedgerError::InsufficientFunds)?;
        Ok(guard.snapshot())
    }

    /// Atomically apply deltas to two distinct accounts as one unit.
    ///
    /// Locks are acquired in ascending account-id order. Both sides are
    /// validated on copies before either record is written, so a failure
    /// on the second account leaves the first untouched.
    pub fn adjust_pair(
        &self,
        a: (AccountId, MilligramsDelta, MilligramsDelta),
        b: (AccountId, MilligramsDelta, MilligramsDelta),
    ) -> Result<(Account, Account), LedgerError> {
        let (a_id, a_balance, a_held) = a;
        let (b_id, b_balance, b_held) = b;
        if a_id == b_id {
            return Err(LedgerError::SameAccount);
        }

        let record_a = self.record(a_id)?;
        let record_b = self.record(b_id)?;

        let (mut guard_a, mut guard_b) = if a_id < b_id {
            let guard_a = Self::lock_record(&record_a)?;
            let guard_b = Self::lock_record(&record_b)?;
            (guard_a, guard_b)
        } else {
            let guard_b = Self::lock_record(&record_b)?;
            let guard_a = Self::lock_record(&record_a)?;
            (guard_a, guard_b)
        };

        Self::check_frozen(&guard_a, a_held)?;
        Self::check_frozen(&guard_b, b_held)?;

        // Validate both sides before committing either
        let mut balance_a = guard_a.balance;
        balance_a
            .apply(a_balance, a_held)
            .map_err(|_| LedgerError::InsufficientFunds)?;
        let mut balance_b = guard_b.balance;
        balance_b
            .apply(b_balance, b_held)
            .map_err(|_| LedgerError::InsufficientFunds)?;

        guard_a.balance = balance_a;
        guard_b.balance = balance_b;
        Ok((guard_a.snapshot(), guard_b.snapshot()))
    }

    /// Sum of settled balances over all accounts.
    ///
    /// Audit view; holds and settlements never change it, credits do.
    pub fn total_balance_mg(&self) -> Milligrams {
        let mut total: u64 = 0;
        for entry in self.accounts.iter() {
            if let Ok(guard) = entry.value().lock() {
                total = total.saturating_add(guard.balance.balance());
            }
        }
        total
    }

    fn check_frozen(
        record: &AccountRecord,
        delta_held: MilligramsDelta,
    ) -> Result<(), LedgerError> {
        if record.status == AccountStatus::Frozen && delta_held > 0 {
            return Err(LedgerError::AccountFrozen);
        }
        Ok(())
    }

    fn record(&self, id: AccountId) -> Result<Arc<Mutex<AccountRecord>>, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::AccountNotFound)
    }

    fn lock_record(
        record: &Arc<Mutex<AccountRecord>>,
    ) -> Result<MutexGuard<'_, AccountRecord>, LedgerError> {
        record
            .lock()
            .map_err(|_| LedgerError::StorageUnavailable("account record lock poisoned".to_string()))
    }
}
