//! Civic Registry Association Store
//!
//! Directed, typed relationships between a subject (person or organization)
//! and an object (organization, proceeding, instrument, document or person).
//! Bidirectionally indexed; each association owns its involvement records.
//!
//! # Key Types
//! - `Association`: The edge, with activity window and significance
//! - `InvolvementRecord`: Discrete real-world action under an association
//! - `AssociationObserver`: Post-commit hook run after every creation
//! - `AssociationStore`: Versioned store with subject/object indexes

pub mod association;
pub mod error;
pub mod involvement;
pub mod observer;
pub mod search;
pub mod store;

pub use association::{
    Association, AssociationUpdate, EntityRef, InvolvementType, NewAssociation, Significance,
};
pub use error::{AssociationError, AssociationResult};
pub use involvement::{InvolvementExtra, InvolvementRecord};
pub use observer::AssociationObserver;
pub use search::{AssociationCriteria, AssociationSummary};
pub use store::AssociationStore;
