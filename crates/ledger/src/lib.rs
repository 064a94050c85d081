//! Civic Registry Change Ledger
//!
//! Every mutation of every entity goes through this crate. Records are
//! immutable once appended; the only way to undo a value is to append a new
//! record.
//!
//! # Key Types
//! - `ChangeDraft`: A change before it is sealed into the ledger
//! - `ChangeRecord`: Sealed, hash-chained ledger entry
//! - `ChangeType`: CREATE, UPDATE, ... vocabulary
//! - `ChangeLedger`: Append-only store with per-entity chains

pub mod audit;
pub mod chain;
pub mod error;
pub mod ledger;
pub mod record;

pub use audit::AuditMetadata;
pub use chain::{calculate_commit_hash, signature_placeholder, verify_chain, ChainError};
pub use error::{LedgerError, LedgerResult};
pub use ledger::ChangeLedger;
pub use record::{ChangeDraft, ChangeRecord, ChangeType, VerificationStatus};
