//! Civic Registry core types
//!
//! Shared by every other crate in the workspace.
//!
//! # Key Types
//! - `FieldValue`: Tagged union of every value a versioned field can hold
//! - `FieldChange`: One field's before/after inside a change record
//! - `Versioned`: Explicit list of versioned fields exposed by an entity
//! - `ChangeAuthor`: Authenticated author supplied by the calling layer
//! - `EntityType` / `EntityKind`: Ledger entity types and association endpoint kinds

pub mod author;
pub mod error;
pub mod hash;
pub mod kind;
pub mod stake;
pub mod value;

pub use author::ChangeAuthor;
pub use error::CoreError;
pub use hash::{canonical_digest, digest, new_id};
pub use kind::{EntityKind, EntityType, OwnerKind};
pub use stake::OwnershipStake;
pub use value::{creation_changes, diff_fields, FieldChange, FieldValue, Versioned};
