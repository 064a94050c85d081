//! Entity Store - people and organizations with versioned mutation
//!
//! Each entity sits behind its own mutex. A mutation locks only that entity
//! while it diffs, appends to the ledger and writes back, so the ledger head
//! for an entity is only ever observed by one writer at a time and writers to
//! different entities do not wait on each other.

use civic_core::{
    creation_changes, diff_fields, new_id, ChangeAuthor, EntityType, OwnershipStake, Versioned,
};
use civic_ledger::{ChangeDraft, ChangeLedger, ChangeRecord, ChangeType};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EntityError, EntityResult};
use crate::index::NameIndex;
use crate::organization::{
    NewOrganization, Organization, OrganizationCriteria, OrganizationSummary, OrganizationUpdate,
};
use crate::person::{NewPerson, Person, PersonCriteria, PersonSummary, PersonUpdate};

/// An entity whose mutations are recorded in the ledger
pub trait TrackedEntity: Versioned + Clone {
    fn id(&self) -> &str;
    fn legal_name(&self) -> &str;
    fn version(&self) -> u32;
    /// Fold a sealed record into version, change history and audit metadata
    fn apply_record(&mut self, record: &ChangeRecord);
}

/// Rows of one entity type plus their name index
struct EntityTable<T> {
    entity_type: EntityType,
    rows: RwLock<HashMap<String, Arc<Mutex<T>>>>,
    names: RwLock<NameIndex>,
}

impl<T: TrackedEntity> EntityTable<T> {
    fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            rows: RwLock::new(HashMap::new()),
            names: RwLock::new(NameIndex::new()),
        }
    }

    fn cell(&self, id: &str) -> Option<Arc<Mutex<T>>> {
        self.rows.read().get(id).cloned()
    }

    fn snapshot(&self, id: &str) -> Option<T> {
        self.cell(id).map(|cell| cell.lock().clone())
    }

    fn snapshots(&self) -> Vec<T> {
        let cells: Vec<_> = self.rows.read().values().cloned().collect();
        cells.iter().map(|cell| cell.lock().clone()).collect()
    }

    fn by_name(&self, name: &str) -> Vec<T> {
        let ids = self.names.read().lookup(name);
        ids.iter()
            .filter_map(|id| self.snapshot(id))
            // Guard against a reader racing a rename between index and row
            .filter(|row| row.legal_name().trim().to_lowercase() == name.trim().to_lowercase())
            .collect()
    }

    fn not_found(&self, id: &str) -> EntityError {
        EntityError::NotFound {
            entity_type: self.entity_type,
            id: id.to_string(),
        }
    }
}

/// Store for people and organizations
pub struct EntityStore {
    ledger: Arc<ChangeLedger>,
    people: EntityTable<Person>,
    organizations: EntityTable<Organization>,
}

impl EntityStore {
    pub fn new(ledger: Arc<ChangeLedger>) -> Self {
        Self {
            ledger,
            people: EntityTable::new(EntityType::Person),
            organizations: EntityTable::new(EntityType::Organization),
        }
    }

    pub fn ledger(&self) -> &Arc<ChangeLedger> {
        &self.ledger
    }

    // === People ===

    pub fn register_person(&self, data: NewPerson, author: &ChangeAuthor) -> EntityResult<Person> {
        validate_name(&data.legal_name)?;
        if data.reputation_score > 100 {
            return Err(EntityError::Validation(format!(
                "reputation_score {} exceeds 100",
                data.reputation_score
            )));
        }
        let person = data.into_person(new_id(), author);
        self.create(&self.people, person, author)
    }

    pub fn update_person(
        &self,
        id: &str,
        updates: PersonUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> EntityResult<Person> {
        if let Some(ref name) = updates.legal_name {
            validate_name(name)?;
        }
        if updates.reputation_score.is_some_and(|s| s > 100) {
            return Err(EntityError::Validation("reputation_score exceeds 100".to_string()));
        }
        self.update(&self.people, id, author, reason, |person| updates.apply_to(person))
    }

    pub fn get_person(&self, id: &str) -> EntityResult<Person> {
        self.people
            .snapshot(id)
            .ok_or_else(|| self.people.not_found(id))
    }

    pub fn person_exists(&self, id: &str) -> bool {
        self.people.cell(id).is_some()
    }

    /// Linear scan; results sorted by legal name then id
    pub fn search_people(&self, criteria: &PersonCriteria) -> Vec<PersonSummary> {
        let mut results: Vec<PersonSummary> = self
            .people
            .snapshots()
            .iter()
            .filter(|p| criteria.matches(p))
            .map(PersonSummary::from)
            .collect();
        results.sort_by(|a, b| a.legal_name.cmp(&b.legal_name).then(a.id.cmp(&b.id)));
        results
    }

    /// Exact, case-insensitive legal name lookup through the name index
    pub fn find_people_by_name(&self, name: &str) -> Vec<Person> {
        self.people.by_name(name)
    }

    // === Organizations ===

    pub fn register_organization(
        &self,
        data: NewOrganization,
        author: &ChangeAuthor,
    ) -> EntityResult<Organization> {
        validate_name(&data.legal_name)?;
        validate_stakes(&data.ownership)?;
        let organization = data.into_organization(new_id(), author);
        self.create(&self.organizations, organization, author)
    }

    pub fn update_organization(
        &self,
        id: &str,
        updates: OrganizationUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> EntityResult<Organization> {
        if let Some(ref name) = updates.legal_name {
            validate_name(name)?;
        }
        if let Some(ref stakes) = updates.ownership {
            validate_stakes(stakes)?;
            if stakes.iter().any(|s| s.owner_id == id) {
                return Err(EntityError::Validation(format!(
                    "organization {} cannot own itself",
                    id
                )));
            }
        }
        self.update(&self.organizations, id, author, reason, |org| {
            updates.apply_to(org)
        })
    }

    /// Replace an organization's ownership structure
    pub fn set_ownership(
        &self,
        id: &str,
        stakes: Vec<OwnershipStake>,
        author: &ChangeAuthor,
        reason: &str,
    ) -> EntityResult<Organization> {
        self.update_organization(id, OrganizationUpdate::ownership(stakes), author, reason)
    }

    pub fn get_organization(&self, id: &str) -> EntityResult<Organization> {
        self.organizations
            .snapshot(id)
            .ok_or_else(|| self.organizations.not_found(id))
    }

    pub fn organization_exists(&self, id: &str) -> bool {
        self.organizations.cell(id).is_some()
    }

    pub fn search_organizations(&self, criteria: &OrganizationCriteria) -> Vec<OrganizationSummary> {
        let mut results: Vec<OrganizationSummary> = self
            .organizations
            .snapshots()
            .iter()
            .filter(|o| criteria.matches(o))
            .map(OrganizationSummary::from)
            .collect();
        results.sort_by(|a, b| a.legal_name.cmp(&b.legal_name).then(a.id.cmp(&b.id)));
        results
    }

    pub fn find_organizations_by_name(&self, name: &str) -> Vec<Organization> {
        self.organizations.by_name(name)
    }

    /// Display name of a registered person or organization
    pub fn display_name(&self, id: &str) -> Option<String> {
        if let Some(person) = self.people.snapshot(id) {
            return Some(person.display_name().to_string());
        }
        self.organizations.snapshot(id).map(|o| o.legal_name)
    }

    // === Shared versioning ===

    fn create<T: TrackedEntity>(
        &self,
        table: &EntityTable<T>,
        mut entity: T,
        author: &ChangeAuthor,
    ) -> EntityResult<T> {
        let draft = ChangeDraft::new(
            table.entity_type,
            entity.id(),
            ChangeType::Create,
            author.clone(),
            format!("{} registered", table.entity_type),
        )
        .changes(creation_changes(&entity))
        .expect_version(1);

        let id = entity.id().to_string();
        {
            // Held across the append so the CREATE record and the row appear together
            let mut rows = table.rows.write();
            let mut names = table.names.write();
            let record = self.ledger.append(draft)?;
            entity.apply_record(&record);
            rows.insert(id.clone(), Arc::new(Mutex::new(entity.clone())));
            names.insert(entity.legal_name(), &id);
        }

        tracing::info!(
            entity_type = %table.entity_type,
            entity_id = %id,
            author = %author.id,
            "Entity registered"
        );
        Ok(entity)
    }

    fn update<T: TrackedEntity>(
        &self,
        table: &EntityTable<T>,
        id: &str,
        author: &ChangeAuthor,
        reason: &str,
        apply: impl FnOnce(&mut T),
    ) -> EntityResult<T> {
        let cell = table.cell(id).ok_or_else(|| table.not_found(id))?;
        let mut current = cell.lock();

        let mut next = current.clone();
        apply(&mut next);
        let changes = diff_fields(&*current, &next);

        let draft = ChangeDraft::new(table.entity_type, id, ChangeType::Update, author.clone(), reason)
            .changes(changes)
            .expect_version(current.version() + 1);
        let record = self.ledger.append(draft)?;
        next.apply_record(&record);

        if current.legal_name() != next.legal_name() {
            table
                .names
                .write()
                .rename(current.legal_name(), next.legal_name(), id);
        }
        *current = next.clone();

        tracing::info!(
            entity_type = %table.entity_type,
            entity_id = %id,
            version = next.version(),
            fields = record.changes.len(),
            author = %author.id,
            "Entity updated"
        );
        Ok(next)
    }
}

fn validate_name(name: &str) -> EntityResult<()> {
    if name.trim().is_empty() {
        return Err(EntityError::Validation("legal_name cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_stakes(stakes: &[OwnershipStake]) -> EntityResult<()> {
    for stake in stakes {
        stake.validate()?;
    }
    Ok(())
}
