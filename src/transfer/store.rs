//! Transfer record store
//!
//! Each transfer lives behind its own lock; the workflow's check-and-set
//! on status happens under that lock. Holders of a record lock never
//! touch the map again, so scans may lock records while iterating
//! without risking a lock cycle.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use tracing::warn;

use crate::account::AccountId;
use crate::core_types::TimestampMs;
use crate::error::LedgerError;

use super::types::{Transfer, TransferId};

#[derive(Default)]
pub struct TransferStore {
    transfers: DashMap<TransferId, Arc<Mutex<Transfer>>>,
}

impl TransferStore {
    pub fn new() -> Self {
        Self {
            transfers: DashMap::new(),
        }
    }

    pub fn insert(&self, transfer: Transfer) {
        self.transfers
            .insert(transfer.id, Arc::new(Mutex::new(transfer)));
    }

    /// Shared handle to one transfer record.
    pub fn record(&self, id: TransferId) -> Result<Arc<Mutex<Transfer>>, LedgerError> {
        self.transfers
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::TransferNotFound(id.to_string()))
    }

    /// Cloned copy of one transfer's current state.
    pub fn snapshot(&self, id: TransferId) -> Result<Transfer, LedgerError> {
        let record = self.record(id)?;
        let guard = Self::lock(&record)?;
        Ok(guard.clone())
    }

    pub fn lock(record: &Arc<Mutex<Transfer>>) -> Result<MutexGuard<'_, Transfer>, LedgerError> {
        record
            .lock()
            .map_err(|_| LedgerError::StorageUnavailable("transfer record lock poisoned".to_string()))
    }

    /// All pending transfers addressed to the given account.
    pub fn pending_incoming(&self, account: AccountId) -> Vec<Transfer> {
        self.scan(|transfer| transfer.is_pending() && transfer.to_account == account)
    }

    /// All terminal transfers touching the given account, on either side.
    pub fn completed_for(&self, account: AccountId) -> Vec<Transfer> {
        self.scan(|transfer| {
            !transfer.is_pending()
                && (transfer.from_account == account || transfer.to_account == account)
        })
    }

    /// Ids of up to `limit` pending transfers whose deadline has passed.
    ///
    /// A returned id is only a candidate: the record may reach a terminal
    /// state before the caller re-checks it under the record lock.
    pub fn expired_pending_ids(&self, now: TimestampMs, limit: usize) -> Vec<TransferId> {
        let mut ids = Vec::new();
        for entry in self.transfers.iter() {
            if ids.len() >= limit {
                break;
            }
            match entry.value().lock() {
                Ok(guard) => {
                    if guard.is_pending() && guard.expires_at <= now {
                        ids.push(guard.id);
                    }
                }
                Err(_) => {
                    warn!(transfer = %entry.key(), "Skipping poisoned transfer record");
                }
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    fn scan(&self, keep: impl Fn(&Transfer) -> bool) -> Vec<Transfer> {
        let mut out = Vec::new();
        for entry in self.transfers.iter() {
            match entry.value().lock() {
                Ok(guard) => {
                    if keep(&guard) {
                        out.push(guard.clone());
                    }
                }
                Err(_) => {
                    warn!(transfer = %entry.key(), "Skipping poisoned transfer record");
                }
            }
        }
        out
    }
}
