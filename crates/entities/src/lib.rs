//! Civic Registry Entity Store
//!
//! Holds People and Organizations. Every mutation is versioned through the
//! change ledger; nothing is ever hard-deleted, retirement is a status change.

pub mod error;
pub mod index;
pub mod organization;
pub mod person;
pub mod store;

pub use civic_ledger::AuditMetadata;
pub use error::{EntityError, EntityResult};
pub use index::NameIndex;
pub use organization::{
    NewOrganization, Organization, OrganizationCriteria, OrganizationStatus, OrganizationSummary,
    OrganizationType, OrganizationUpdate,
};
pub use person::{
    NewPerson, Person, PersonCriteria, PersonStatus, PersonSummary, PersonUpdate, VerificationLevel,
};
pub use store::EntityStore;
