//! Association observers - post-commit hooks on creation and reactivation

use civic_core::ChangeAuthor;

use crate::association::Association;
use crate::error::AssociationResult;
use crate::store::AssociationStore;

/// Runs after an association is committed and visible in the indexes
///
/// Observers cannot reject the association (it is already in the ledger).
/// A failing observer is logged and the remaining observers still run.
pub trait AssociationObserver: Send + Sync {
    /// Observer name for logging
    fn name(&self) -> &str;

    /// Priority (lower = runs first)
    fn priority(&self) -> u32 {
        100
    }

    fn on_association_created(
        &self,
        association: &Association,
        author: &ChangeAuthor,
        store: &AssociationStore,
    ) -> AssociationResult<()>;

    /// An update moved `is_active` from false to true
    fn on_association_reactivated(
        &self,
        _association: &Association,
        _author: &ChangeAuthor,
        _store: &AssociationStore,
    ) -> AssociationResult<()> {
        Ok(())
    }
}
