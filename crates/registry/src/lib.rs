//! Civic Registry - facade and CLI orchestration
//!
//! `Registry` wires one change ledger, the entity and association stores,
//! the conflict detector and the read-side engines into a single
//! constructible object. Several registries can live side by side.

pub mod commands;
pub mod config;
pub mod error;
pub mod registry;
pub mod scenario;

pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use registry::Registry;
pub use scenario::{Scenario, ScenarioRun, Step};
