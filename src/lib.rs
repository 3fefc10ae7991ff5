//! Tea Ledger - Escrowed Virtual-Currency Transfers
//!
//! An in-memory ledger for a virtual currency measured in milligrams of
//! tea. Transfers hold funds on the sender until the recipient
//! explicitly confirms; unconfirmed transfers expire and the held funds
//! come back by themselves.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, Milligrams, etc.)
//! - [`clock`] - Injectable time source
//! - [`balance`] - Enforced balance type with hold accounting
//! - [`account`] - Account records for users and teams
//! - [`escrow`] - Hold / settle / release primitives
//! - [`transfer`] - Transfer lifecycle, storage and expiry sweeping
//! - [`query`] - Read-side views and pagination
//! - [`config`] - YAML application configuration
//! - [`logging`] - Tracing setup

// Core types - must be first!
pub mod core_types;

// Infrastructure
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

// Ledger components
pub mod account;
pub mod balance;
pub mod escrow;
pub mod query;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountId, AccountStatus, AccountStore, OwnerRef, OwnerType};
pub use balance::TeaBalance;
pub use clock::{Clock, ManualClock};
pub use core_types::{Milligrams, MilligramsDelta, TeamId, TimestampMs, UserId};
pub use error::LedgerError;
pub use escrow::EscrowLedger;
pub use query::{AccountSummary, Page, PageRequest, QueryFacade, TransferSummary};
pub use transfer::{
    ExpirySweeper, MembershipVerifier, StaticMembership, SweeperConfig, Transfer, TransferId,
    TransferRequest, TransferStatus, TransferStore, TransferType, TransferWorkflow,
};
