//! Conflict detector
//!
//! Runs as an association observer: every time an association is created for
//! a PERSON subject, the person's full association set is re-partitioned into
//! government roles and private interests and every active pair not yet
//! flagged becomes a new conflict. Reactivating an association rescans the
//! same way.

use civic_associations::{
    Association, AssociationError, AssociationObserver, AssociationResult, AssociationStore,
};
use civic_core::{creation_changes, diff_fields, new_id, ChangeAuthor, EntityKind, EntityType};
use civic_ledger::{ChangeDraft, ChangeLedger, ChangeType};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::ConflictConfig;
use crate::conflict::{ConflictOfInterest, ConflictStatus};
use crate::error::{ConflictError, ConflictResult};

pub struct ConflictDetector {
    config: ConflictConfig,
    ledger: Arc<ChangeLedger>,
    rows: RwLock<HashMap<String, Arc<Mutex<ConflictOfInterest>>>>,
    by_person: RwLock<HashMap<String, Vec<String>>>,
    /// (government association id, private interest association id) already flagged
    flagged: Mutex<HashSet<(String, String)>>,
}

impl ConflictDetector {
    pub fn new(ledger: Arc<ChangeLedger>, config: ConflictConfig) -> Self {
        Self {
            config,
            ledger,
            rows: RwLock::new(HashMap::new()),
            by_person: RwLock::new(HashMap::new()),
            flagged: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &ConflictConfig {
        &self.config
    }

    /// Detect and persist new conflicts for one person
    ///
    /// Returns only the conflicts created by this scan.
    pub fn scan_person(
        &self,
        person_id: &str,
        associations: &AssociationStore,
        author: &ChangeAuthor,
    ) -> ConflictResult<Vec<ConflictOfInterest>> {
        let held: Vec<Association> = associations
            .get_associations_for_subject(person_id)
            .into_iter()
            .filter(|a| a.subject.kind == EntityKind::Person && a.is_active)
            .collect();

        let government: Vec<&Association> = held
            .iter()
            .filter(|a| a.involvement_type.is_government_role())
            .collect();
        let private: Vec<&Association> = held
            .iter()
            .filter(|a| a.involvement_type.is_private_interest())
            .collect();

        // Held for the whole scan so concurrent scans cannot flag a pair twice
        let mut flagged = self.flagged.lock();
        let mut detected = Vec::new();

        for gov in &government {
            for interest in &private {
                let pair = (gov.id.clone(), interest.id.clone());
                if flagged.contains(&pair) {
                    continue;
                }
                let conflict = self.record(gov, interest, author)?;
                flagged.insert(pair);
                detected.push(conflict);
            }
        }

        Ok(detected)
    }

    fn record(
        &self,
        government: &Association,
        private: &Association,
        author: &ChangeAuthor,
    ) -> ConflictResult<ConflictOfInterest> {
        let mut conflict =
            ConflictOfInterest::detect(new_id(), government, private, &self.config, author);

        let draft = ChangeDraft::new(
            EntityType::ConflictOfInterest,
            &conflict.id,
            ChangeType::Create,
            author.clone(),
            format!(
                "{} holds {} at {} and {} at {}",
                conflict.person_name,
                conflict.government_role,
                conflict.government_body,
                conflict.private_interest,
                conflict.private_entity
            ),
        )
        .changes(creation_changes(&conflict))
        .expect_version(1);

        {
            // Held across the append so the CREATE record and the conflict appear together
            let mut rows = self.rows.write();
            let mut by_person = self.by_person.write();
            let record = self.ledger.append(draft)?;
            conflict.apply_record(&record);
            rows.insert(conflict.id.clone(), Arc::new(Mutex::new(conflict.clone())));
            by_person
                .entry(conflict.person_id.clone())
                .or_default()
                .push(conflict.id.clone());
        }

        tracing::warn!(
            conflict_id = %conflict.id,
            person_id = %conflict.person_id,
            conflict_type = %conflict.conflict_type,
            severity = %conflict.severity,
            "Conflict of interest detected"
        );
        Ok(conflict)
    }

    /// Move a conflict through its review lifecycle
    pub fn transition(
        &self,
        conflict_id: &str,
        status: ConflictStatus,
        reviewer: &ChangeAuthor,
        notes: Option<String>,
    ) -> ConflictResult<ConflictOfInterest> {
        let cell = self
            .rows
            .read()
            .get(conflict_id)
            .cloned()
            .ok_or_else(|| ConflictError::NotFound(conflict_id.to_string()))?;
        let mut current = cell.lock();

        if !current.status.can_transition_to(status) {
            return Err(ConflictError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let mut next = current.clone();
        next.status = status;
        next.reviewed_by = Some(reviewer.clone());
        if notes.is_some() {
            next.notes = notes;
        }

        let reason = next
            .notes
            .clone()
            .unwrap_or_else(|| format!("Conflict marked {}", status));
        let draft = ChangeDraft::new(
            EntityType::ConflictOfInterest,
            conflict_id,
            ChangeType::Update,
            reviewer.clone(),
            reason,
        )
        .changes(diff_fields(&*current, &next))
        .expect_version(current.version + 1);

        let record = self.ledger.append(draft)?;
        next.apply_record(&record);
        *current = next.clone();

        tracing::info!(
            conflict_id = %conflict_id,
            status = %status,
            reviewer = %reviewer.id,
            "Conflict status changed"
        );
        Ok(next)
    }

    pub fn get_conflict(&self, id: &str) -> ConflictResult<ConflictOfInterest> {
        self.rows
            .read()
            .get(id)
            .map(|cell| cell.lock().clone())
            .ok_or_else(|| ConflictError::NotFound(id.to_string()))
    }

    pub fn conflicts_for_person(&self, person_id: &str) -> Vec<ConflictOfInterest> {
        let ids = self
            .by_person
            .read()
            .get(person_id)
            .cloned()
            .unwrap_or_default();
        let rows = self.rows.read();
        ids.iter()
            .filter_map(|id| rows.get(id))
            .map(|cell| cell.lock().clone())
            .collect()
    }

    /// All conflicts, optionally filtered by status, oldest first
    pub fn list_conflicts(&self, status: Option<ConflictStatus>) -> Vec<ConflictOfInterest> {
        let cells: Vec<_> = self.rows.read().values().cloned().collect();
        let mut conflicts: Vec<ConflictOfInterest> = cells
            .iter()
            .map(|cell| cell.lock().clone())
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect();
        conflicts.sort_by(|a, b| a.detected_at.cmp(&b.detected_at).then(a.id.cmp(&b.id)));
        conflicts
    }
}

impl AssociationObserver for ConflictDetector {
    fn name(&self) -> &str {
        "conflict_detector"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn on_association_created(
        &self,
        association: &Association,
        author: &ChangeAuthor,
        store: &AssociationStore,
    ) -> AssociationResult<()> {
        self.scan_subject(association, author, store)
    }

    fn on_association_reactivated(
        &self,
        association: &Association,
        author: &ChangeAuthor,
        store: &AssociationStore,
    ) -> AssociationResult<()> {
        self.scan_subject(association, author, store)
    }
}

impl ConflictDetector {
    fn scan_subject(
        &self,
        association: &Association,
        author: &ChangeAuthor,
        store: &AssociationStore,
    ) -> AssociationResult<()> {
        if association.subject.kind != EntityKind::Person {
            return Ok(());
        }
        self.scan_person(&association.subject.id, store, author)
            .map(|_| ())
            .map_err(|e| AssociationError::Observer {
                observer: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_associations::{AssociationUpdate, EntityRef, InvolvementType, NewAssociation};
    use rust_decimal_macros::dec;

    use crate::conflict::{ConflictType, Severity};

    struct Fixture {
        store: AssociationStore,
        detector: Arc<ConflictDetector>,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(ChangeLedger::new());
        let store = AssociationStore::new(ledger.clone());
        let detector = Arc::new(ConflictDetector::new(ledger, ConflictConfig::default()));
        store.register_observer(detector.clone());
        Fixture { store, detector }
    }

    fn author() -> ChangeAuthor {
        ChangeAuthor::new("U1", "Clerk")
    }

    fn jane() -> EntityRef {
        EntityRef::new("P1", EntityKind::Person, "Jane Doe")
    }

    fn org(id: &str) -> EntityRef {
        EntityRef::new(id, EntityKind::Organization, format!("Org {}", id))
    }

    #[test]
    fn test_critical_ownership_conflict() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::ElectedRepresentative),
                &author(),
            )
            .unwrap();
        assert!(f.detector.conflicts_for_person("P1").is_empty());

        f.store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::Owner)
                    .financial_value(dec!(2000000)),
                &author(),
            )
            .unwrap();

        let conflicts = f.detector.conflicts_for_person("P1");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::OwnershipStake);
        assert_eq!(conflicts[0].severity, Severity::Critical);
        assert_eq!(conflicts[0].status, ConflictStatus::Detected);
        assert_eq!(conflicts[0].version, 1);

        let records = f
            .store
            .ledger()
            .records_for(EntityType::ConflictOfInterest, &conflicts[0].id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].changed_by, author());
    }

    #[test]
    fn test_pairs_flagged_once() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::CommitteeMember),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::BoardMember),
                &author(),
            )
            .unwrap();
        // Unrelated association retriggers the scan
        f.store
            .create_association(
                NewAssociation::new(jane(), org("C"), InvolvementType::Advisor),
                &author(),
            )
            .unwrap();

        assert_eq!(f.detector.conflicts_for_person("P1").len(), 1);
        assert!(f
            .detector
            .scan_person("P1", &f.store, &author())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_severity_by_significance() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::AppointedOfficial).primary(),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::Lobbyist).primary(),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("C"), InvolvementType::Investor),
                &author(),
            )
            .unwrap();

        let mut conflicts = f.detector.conflicts_for_person("P1");
        conflicts.sort_by_key(|c| c.severity);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].severity, Severity::Medium);
        assert_eq!(conflicts[0].conflict_type, ConflictType::FinancialInterest);
        assert_eq!(conflicts[1].severity, Severity::High);
        assert_eq!(conflicts[1].conflict_type, ConflictType::LobbyingRelationship);
    }

    #[test]
    fn test_inactive_and_organization_subjects_ignored() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::ElectedExecutive),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::Owner).inactive(),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(org("X"), org("Y"), InvolvementType::Owner),
                &author(),
            )
            .unwrap();

        assert!(f.detector.list_conflicts(None).is_empty());
    }

    #[test]
    fn test_reactivation_rescans() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::ElectedRepresentative),
                &author(),
            )
            .unwrap();
        let dormant = f
            .store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::BoardMember).inactive(),
                &author(),
            )
            .unwrap();
        assert!(f.detector.conflicts_for_person("P1").is_empty());

        let update = AssociationUpdate {
            is_active: Some(true),
            ..AssociationUpdate::default()
        };
        f.store
            .update_association(&dormant.id, update, &author(), "rejoined board")
            .unwrap();

        let conflicts = f.detector.conflicts_for_person("P1");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::BoardMembership);
    }

    #[test]
    fn test_transition_lifecycle() {
        let f = fixture();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("A"), InvolvementType::ElectedRepresentative),
                &author(),
            )
            .unwrap();
        f.store
            .create_association(
                NewAssociation::new(jane(), org("B"), InvolvementType::Executive),
                &author(),
            )
            .unwrap();

        let id = f.detector.list_conflicts(None)[0].id.clone();
        let reviewer = ChangeAuthor::new("R1", "Ethics Officer");

        let reviewed = f
            .detector
            .transition(&id, ConflictStatus::Reviewed, &reviewer, Some("disclosed".to_string()))
            .unwrap();
        assert_eq!(reviewed.version, 2);
        assert_eq!(reviewed.reviewed_by, Some(reviewer.clone()));

        f.detector
            .transition(&id, ConflictStatus::Resolved, &reviewer, None)
            .unwrap();
        let result = f
            .detector
            .transition(&id, ConflictStatus::Dismissed, &reviewer, None);
        assert!(matches!(result, Err(ConflictError::InvalidTransition { .. })));

        assert_eq!(f.detector.list_conflicts(Some(ConflictStatus::Resolved)).len(), 1);
        assert_eq!(
            f.store
                .ledger()
                .verify_entity(EntityType::ConflictOfInterest, &id)
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_unknown_conflict() {
        let f = fixture();
        assert!(matches!(
            f.detector.get_conflict("missing"),
            Err(ConflictError::NotFound(_))
        ));
    }
}
