//! Registry facade - wires the stores and engines together

use civic_associations::{
    Association, AssociationCriteria, AssociationStore, AssociationSummary, AssociationUpdate,
    EntityRef, InvolvementExtra, InvolvementRecord, NewAssociation,
};
use civic_conflict::{ConflictDetector, ConflictOfInterest, ConflictStatus};
use civic_core::{ChangeAuthor, EntityKind, EntityType, OwnershipStake};
use civic_entities::{
    EntityStore, NewOrganization, NewPerson, Organization, OrganizationCriteria,
    OrganizationSummary, OrganizationUpdate, Person, PersonCriteria, PersonSummary, PersonUpdate,
};
use civic_history::{
    BlameResult, ContributorSummary, EntityDiff, HistoryEngine, HistoryQuery, Page, PageRequest,
    TimelineEntry,
};
use civic_ledger::{ChangeLedger, ChangeRecord, ChangeType};
use civic_network::{BeneficialOwner, NetworkAnalyzer, NetworkGraph, OwnershipAnalysis};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::RegistryResult;

/// Civic registry
///
/// All stores share one ledger. The conflict detector is registered as an
/// association observer, so it runs synchronously after every creation.
pub struct Registry {
    config: RegistryConfig,
    ledger: Arc<ChangeLedger>,
    entities: Arc<EntityStore>,
    associations: Arc<AssociationStore>,
    conflicts: Arc<ConflictDetector>,
    history: HistoryEngine,
    network: NetworkAnalyzer,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        let ledger = Arc::new(ChangeLedger::new());
        let entities = Arc::new(EntityStore::new(ledger.clone()));
        let associations = Arc::new(AssociationStore::new(ledger.clone()));
        let conflicts = Arc::new(ConflictDetector::new(
            ledger.clone(),
            config.conflict.clone(),
        ));
        associations.register_observer(conflicts.clone());

        let history = HistoryEngine::new(ledger.clone(), config.history.clone());
        let network = NetworkAnalyzer::new(
            entities.clone(),
            associations.clone(),
            config.network.clone(),
        );

        tracing::debug!("Registry initialized");
        Self {
            config,
            ledger,
            entities,
            associations,
            conflicts,
            history,
            network,
        }
    }

    /// Registry with default configuration
    pub fn in_memory() -> Self {
        Self::new(RegistryConfig::default())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<ChangeLedger> {
        &self.ledger
    }

    pub fn entities(&self) -> &Arc<EntityStore> {
        &self.entities
    }

    pub fn associations(&self) -> &Arc<AssociationStore> {
        &self.associations
    }

    // === People ===

    pub fn register_person(&self, data: NewPerson, author: &ChangeAuthor) -> RegistryResult<Person> {
        Ok(self.entities.register_person(data, author)?)
    }

    pub fn update_person(
        &self,
        id: &str,
        updates: PersonUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> RegistryResult<Person> {
        Ok(self.entities.update_person(id, updates, author, reason)?)
    }

    pub fn get_person(&self, id: &str) -> RegistryResult<Person> {
        Ok(self.entities.get_person(id)?)
    }

    pub fn search_people(&self, criteria: &PersonCriteria) -> Vec<PersonSummary> {
        self.entities.search_people(criteria)
    }

    pub fn find_people_by_name(&self, name: &str) -> Vec<Person> {
        self.entities.find_people_by_name(name)
    }

    // === Organizations ===

    pub fn register_organization(
        &self,
        data: NewOrganization,
        author: &ChangeAuthor,
    ) -> RegistryResult<Organization> {
        Ok(self.entities.register_organization(data, author)?)
    }

    pub fn update_organization(
        &self,
        id: &str,
        updates: OrganizationUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> RegistryResult<Organization> {
        Ok(self.entities.update_organization(id, updates, author, reason)?)
    }

    pub fn set_ownership(
        &self,
        id: &str,
        stakes: Vec<OwnershipStake>,
        author: &ChangeAuthor,
        reason: &str,
    ) -> RegistryResult<Organization> {
        Ok(self.entities.set_ownership(id, stakes, author, reason)?)
    }

    pub fn get_organization(&self, id: &str) -> RegistryResult<Organization> {
        Ok(self.entities.get_organization(id)?)
    }

    pub fn search_organizations(&self, criteria: &OrganizationCriteria) -> Vec<OrganizationSummary> {
        self.entities.search_organizations(criteria)
    }

    pub fn find_organizations_by_name(&self, name: &str) -> Vec<Organization> {
        self.entities.find_organizations_by_name(name)
    }

    /// Denormalized reference to a registered person or organization
    pub fn entity_ref(&self, id: &str) -> RegistryResult<EntityRef> {
        if let Ok(person) = self.entities.get_person(id) {
            return Ok(EntityRef::new(id, EntityKind::Person, person.display_name()));
        }
        let organization = self.entities.get_organization(id)?;
        Ok(EntityRef::new(
            id,
            EntityKind::Organization,
            organization.legal_name,
        ))
    }

    // === Associations ===

    /// Create an association; conflict detection runs before this returns
    pub fn create_association(
        &self,
        data: NewAssociation,
        author: &ChangeAuthor,
    ) -> RegistryResult<Association> {
        Ok(self.associations.create_association(data, author)?)
    }

    pub fn record_involvement(
        &self,
        association_id: &str,
        action: &str,
        details: &str,
        author: &ChangeAuthor,
        extra: InvolvementExtra,
    ) -> RegistryResult<InvolvementRecord> {
        Ok(self
            .associations
            .record_involvement(association_id, action, details, author, extra)?)
    }

    pub fn update_association(
        &self,
        id: &str,
        updates: AssociationUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> RegistryResult<Association> {
        Ok(self.associations.update_association(id, updates, author, reason)?)
    }

    pub fn get_association(&self, id: &str) -> RegistryResult<Association> {
        Ok(self.associations.get_association(id)?)
    }

    pub fn get_associations_for_subject(&self, id: &str) -> Vec<Association> {
        self.associations.get_associations_for_subject(id)
    }

    pub fn get_associations_for_object(&self, id: &str) -> Vec<Association> {
        self.associations.get_associations_for_object(id)
    }

    pub fn search_associations(&self, criteria: &AssociationCriteria) -> Vec<AssociationSummary> {
        self.associations.search_associations(criteria)
    }

    // === Blame, diff, history ===

    pub fn blame(&self, entity_type: EntityType, entity_id: &str) -> RegistryResult<BlameResult> {
        Ok(self.history.blame(entity_type, entity_id)?)
    }

    pub fn diff(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        from_version: usize,
        to_version: usize,
    ) -> RegistryResult<EntityDiff> {
        Ok(self
            .history
            .diff(entity_type, entity_id, from_version, to_version)?)
    }

    pub fn history(&self, query: &HistoryQuery, page: &PageRequest) -> RegistryResult<Page<ChangeRecord>> {
        Ok(self.history.history(query, page)?)
    }

    pub fn timeline(&self, entity_type: EntityType, entity_id: &str) -> RegistryResult<Vec<TimelineEntry>> {
        Ok(self.history.timeline(entity_type, entity_id)?)
    }

    pub fn contributors(&self, query: &HistoryQuery) -> Vec<ContributorSummary> {
        self.history.contributors(query)
    }

    pub fn change_type_counts(&self, query: &HistoryQuery) -> BTreeMap<ChangeType, usize> {
        self.history.change_type_counts(query)
    }

    // === Conflicts ===

    /// Explicit rescan of one person's associations
    pub fn scan_conflicts(
        &self,
        person_id: &str,
        author: &ChangeAuthor,
    ) -> RegistryResult<Vec<ConflictOfInterest>> {
        Ok(self
            .conflicts
            .scan_person(person_id, &self.associations, author)?)
    }

    pub fn get_conflict(&self, id: &str) -> RegistryResult<ConflictOfInterest> {
        Ok(self.conflicts.get_conflict(id)?)
    }

    pub fn conflicts_for_person(&self, person_id: &str) -> Vec<ConflictOfInterest> {
        self.conflicts.conflicts_for_person(person_id)
    }

    pub fn list_conflicts(&self, status: Option<ConflictStatus>) -> Vec<ConflictOfInterest> {
        self.conflicts.list_conflicts(status)
    }

    pub fn transition_conflict(
        &self,
        id: &str,
        status: ConflictStatus,
        reviewer: &ChangeAuthor,
        notes: Option<String>,
    ) -> RegistryResult<ConflictOfInterest> {
        Ok(self.conflicts.transition(id, status, reviewer, notes)?)
    }

    // === Ownership and network ===

    pub fn ownership_chain(&self, organization_id: &str) -> RegistryResult<Vec<BeneficialOwner>> {
        Ok(self.network.ownership_chain(organization_id)?)
    }

    pub fn ownership_analysis(&self, organization_id: &str) -> RegistryResult<OwnershipAnalysis> {
        Ok(self.network.ownership_analysis(organization_id)?)
    }

    pub fn network_graph(&self, center: &str, depth: usize) -> RegistryResult<NetworkGraph> {
        Ok(self.network.network_graph(center, depth)?)
    }

    // === Audit ===

    /// Verify every entity's hash chain; returns the number of chains checked
    pub fn verify_all(&self) -> RegistryResult<usize> {
        let checked = self.ledger.verify_all()?;
        tracing::info!(chains = checked, records = self.ledger.len(), "Ledger verified");
        Ok(checked)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::in_memory()
    }
}
