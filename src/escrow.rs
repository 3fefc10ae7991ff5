//! Escrow ledger
//!
//! Funds move through three primitives only: `hold` reserves part of the
//! source's available funds, `settle` moves held funds into the
//! destination's balance, `release` returns them to the source. A hold
//! never leaves the source's balance, so the sum of all balances changes
//! only when an account is credited.

use std::sync::Arc;

use tracing::debug;

use crate::account::{Account, AccountId, AccountStore};
use crate::core_types::{Milligrams, MilligramsDelta};
use crate::error::LedgerError;

pub struct EscrowLedger {
    accounts: Arc<AccountStore>,
}

impl EscrowLedger {
    pub fn new(accounts: Arc<AccountStore>) -> Self {
        Self { accounts }
    }

    /// Reserve `amount_mg` of the source's available funds.
    pub fn hold(&self, source: AccountId, amount_mg: Milligrams) -> Result<Account, LedgerError> {
        let amount = Self::signed(amount_mg)?;
        let account = self.accounts.adjust(source, 0, amount)?;
        debug!(
            account = %source,
            amount_mg,
            held_mg = account.held_mg,
            "Hold placed"
        );
        Ok(account)
    }

    /// Move `amount_mg` of held funds out of the source's balance into
    /// the destination's settled balance.
    ///
    /// Works on a frozen source: settlement consumes an existing hold
    /// rather than placing a new one.
    pub fn settle(
        &self,
        source: AccountId,
        destination: AccountId,
        amount_mg: Milligrams,
    ) -> Result<(Account, Account), LedgerError> {
        let amount = Self::signed(amount_mg)?;
        let (source_after, destination_after) = self
            .accounts
            .adjust_pair((source, -amount, -amount), (destination, amount, 0))?;
        debug!(from = %source, to = %destination, amount_mg, "Hold settled");
        Ok((source_after, destination_after))
    }

    /// Return `amount_mg` of held funds to the source's available balance.
    pub fn release(&self, source: AccountId, amount_mg: Milligrams) -> Result<Account, LedgerError> {
        let amount = Self::signed(amount_mg)?;
        let account = self.accounts.adjust(source, 0, -amount)?;
        debug!(account = %source, amount_mg, "Hold released");
        Ok(account)
    }

    fn signed(amount_mg: Milligrams) -> Result<MilligramsDelta, LedgerError> {
        MilligramsDelta::try_from(amount_mg).map_err(|_| LedgerError::InvalidAmount)
    }
}
