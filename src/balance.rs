//! ENFORCED BALANCE TYPE - used by AccountStore
//!
//! This is the single source of truth for one account's tea holdings.
//! ALL balance mutations MUST go through these methods.
//!
//! # Enforcement strategy:
//! 1. Fields are PRIVATE - no direct access
//! 2. All mutations return Result - errors are explicit
//! 3. Version auto-increments - audit trail
//! 4. checked_add/sub - overflow protection

use serde::{Deserialize, Serialize};

use crate::core_types::{Milligrams, MilligramsDelta};

/// Tea holdings of a single account.
///
/// # Invariants (ENFORCED by private fields):
/// - `held <= balance` at all times, so `available = balance - held >= 0`
/// - Held funds stay inside `balance`; a hold moves nothing, it reserves
/// - No overflow/underflow (checked arithmetic)
/// - Version increments once per successful mutation
///
/// # Usage:
/// ```ignore
/// let mut bal = TeaBalance::default();
/// bal.credit(1000)?;       // balance = 1000, available = 1000
/// bal.apply(0, 400)?;      // hold:    balance = 1000, available = 600
/// bal.apply(-400, -400)?;  // settle out: balance = 600, held = 0
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeaBalance {
    balance: u64, // PRIVATE - settled milligrams, includes held
    held: u64,    // PRIVATE - escrowed outgoing milligrams
    version: u64, // PRIVATE - incremented on every successful mutation
}

impl TeaBalance {
    // ============================================================
    // READ-ONLY GETTERS (safe to expose)
    // ============================================================

    /// Settled balance in milligrams (includes held funds).
    #[inline(always)]
    pub const fn balance(&self) -> Milligrams {
        self.balance
    }

    /// Milligrams currently escrowed as outgoing holds.
    #[inline(always)]
    pub const fn held(&self) -> Milligrams {
        self.held
    }

    /// Spendable milligrams: `balance - held`.
    #[inline(always)]
    pub const fn available(&self) -> Milligrams {
        self.balance.saturating_sub(self.held)
    }

    /// Mutation counter, incremented once per successful operation.
    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ============================================================
    // VALIDATED MUTATIONS (ENFORCED operations)
    // ============================================================

    /// Credit inbound funds to the settled balance.
    ///
    /// # Errors
    /// - "Credit overflow" on arithmetic overflow
    pub fn credit(&mut self, amount: Milligrams) -> Result<(), &'static str> {
        self.balance = self.balance.checked_add(amount).ok_or("Credit overflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Apply signed deltas to balance and held as one unit.
    ///
    /// Either both deltas land or neither does. Validation happens on
    /// copies; state is written only after both fields pass.
    ///
    /// # Errors
    /// - "Insufficient funds" if balance or available would go negative
    /// - "Insufficient held funds" if held would go negative
    /// - "Balance overflow" / "Held overflow" on arithmetic overflow
    pub fn apply(
        &mut self,
        delta_balance: MilligramsDelta,
        delta_held: MilligramsDelta,
    ) -> Result<(), &'static str> {
        // Validate first
        let new_balance = Self::shift(
            self.balance,
            delta_balance,
            "Balance overflow",
            "Insufficient funds",
        )?;
        let new_held = Self::shift(
            self.held,
            delta_held,
            "Held overflow",
            "Insufficient held funds",
        )?;
        if new_held > new_balance {
            return Err("Insufficient funds");
        }

        // Apply atomically
        self.balance = new_balance;
        self.held = new_held;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    fn shift(
        value: u64,
        delta: i64,
        overflow: &'static str,
        underflow: &'static str,
    ) -> Result<u64, &'static str> {
        if delta >= 0 {
            value.checked_add(delta.unsigned_abs()).ok_or(overflow)
        } else {
            value.checked_sub(delta.unsigned_abs()).ok_or(underflow)
        }
    }
}

// ============================================================
// TESTS - Prove enforcement works
// ============================================================
