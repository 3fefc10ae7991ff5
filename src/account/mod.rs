//! Account management module
//!
//! In-memory account records for users and teams, one per owner.

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::{Account, AccountId, AccountStatus, OwnerRef, OwnerType};
pub use store::AccountStore;
