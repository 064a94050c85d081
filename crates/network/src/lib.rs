//! Civic Registry Ownership & Network Analyzer
//!
//! Beneficial-ownership resolution over organization ownership stakes and
//! bounded-depth relationship graphs over associations. Both traversals are
//! read-only and terminate on cyclic data.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod graph;
pub mod ownership;

pub use analyzer::NetworkAnalyzer;
pub use config::NetworkConfig;
pub use error::{NetworkError, NetworkResult};
pub use graph::{NetworkEdge, NetworkGraph, NetworkNode};
pub use ownership::{BeneficialOwner, OwnershipAnalysis};
