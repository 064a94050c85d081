//! Civic Registry Conflict-of-Interest Detector
//!
//! Rule-based flagging of people who hold an active government role and an
//! active private interest at the same time. Findings are heuristics for
//! human review, recorded in the change ledger and moved through a small
//! review lifecycle by the calling layer.
//!
//! # Key Types
//! - `ConflictDetector`: Association observer and conflict store
//! - `ConflictOfInterest`: One flagged (government role, private interest) pair
//! - `ConflictConfig`: Severity thresholds

pub mod config;
pub mod conflict;
pub mod detector;
pub mod error;

pub use config::ConflictConfig;
pub use conflict::{ConflictOfInterest, ConflictStatus, ConflictType, Severity};
pub use detector::ConflictDetector;
pub use error::{ConflictError, ConflictResult};
