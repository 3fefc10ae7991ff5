//! Core types used throughout the ledger
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - globally unique, immutable after assignment.
///
/// Assigned by the surrounding application; the ledger never mints these.
pub type UserId = u64;

/// Team ID - globally unique, immutable after assignment.
///
/// Same ID space discipline as [`UserId`], owned by the surrounding
/// application's team management.
pub type TeamId = u64;

/// Amount in milligrams, the smallest indivisible unit of tea.
///
/// # Constraints:
/// - **Integer only**: No fractional amounts, no floating point anywhere
/// - **Non-negative**: Signed deltas exist only as [`MilligramsDelta`]
pub type Milligrams = u64;

/// Signed milligram delta, used by balance adjustment primitives.
pub type MilligramsDelta = i64;

/// Timestamp as Unix epoch milliseconds.
pub type TimestampMs = i64;
