//! Escrowed Transfer Lifecycle
//!
//! Implements held transfers with explicit confirmation between user
//! and team accounts.
//!
//! # State Machine
//!
//! ```text
//! PENDING → CONFIRMED | REJECTED | CANCELLED | EXPIRED
//! ```
//!
//! Every terminal state is permanent. A pending transfer holds funds on
//! the source account; exactly one of settle (confirm) or release
//! (reject, cancel, expire) consumes that hold.
//!
//! # Safety Invariants
//!
//! 1. **Check-And-Set**: status changes happen under the transfer
//!    record lock, after re-checking the status is still pending
//! 2. **One Hold, One Outcome**: each hold is settled or released
//!    exactly once
//! 3. **Lock Order**: transfer record before account records, two
//!    account records in ascending id order

pub mod state;
pub mod store;
pub mod sweeper;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use state::TransferStatus;
pub use store::TransferStore;
pub use sweeper::{ExpirySweeper, SweeperConfig};
pub use types::{Transfer, TransferId, TransferRequest, TransferType};
pub use workflow::{MembershipVerifier, StaticMembership, TransferWorkflow};
