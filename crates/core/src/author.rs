//! Change authors

use serde::{Deserialize, Serialize};
use std::fmt;

/// An already-authenticated author of a change
///
/// Constructed by the calling layer; the registry never authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeAuthor {
    /// Person id of the author
    pub id: String,
    /// Display name at the time of the change
    pub name: String,
}

impl ChangeAuthor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Author used for changes the registry makes on its own behalf
    pub fn system() -> Self {
        Self::new("SYSTEM", "System")
    }
}

impl fmt::Display for ChangeAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.id)
    }
}
