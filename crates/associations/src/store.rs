//! Association Store - versioned edges with subject/object indexes

use civic_core::{creation_changes, diff_fields, new_id, ChangeAuthor, EntityType, FieldChange, FieldValue};
use civic_ledger::{ChangeDraft, ChangeLedger, ChangeType};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::association::{Association, AssociationUpdate, NewAssociation};
use crate::error::{AssociationError, AssociationResult};
use crate::involvement::{InvolvementExtra, InvolvementRecord};
use crate::observer::AssociationObserver;
use crate::search::{AssociationCriteria, AssociationSummary};

/// Field path used for involvement record additions
pub const INVOLVEMENT_FIELD: &str = "involvement_records";

#[derive(Default)]
struct Indexes {
    by_subject: HashMap<String, Vec<String>>,
    by_object: HashMap<String, Vec<String>>,
}

/// Store for associations
pub struct AssociationStore {
    ledger: Arc<ChangeLedger>,
    rows: RwLock<HashMap<String, Arc<Mutex<Association>>>>,
    indexes: RwLock<Indexes>,
    observers: RwLock<Vec<Arc<dyn AssociationObserver>>>,
}

impl AssociationStore {
    pub fn new(ledger: Arc<ChangeLedger>) -> Self {
        Self {
            ledger,
            rows: RwLock::new(HashMap::new()),
            indexes: RwLock::new(Indexes::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<ChangeLedger> {
        &self.ledger
    }

    /// Register a post-commit observer
    pub fn register_observer(&self, observer: Arc<dyn AssociationObserver>) {
        let mut observers = self.observers.write();
        observers.push(observer);
        observers.sort_by_key(|o| o.priority());
    }

    /// Create an association, index it, then notify observers
    pub fn create_association(
        &self,
        data: NewAssociation,
        author: &ChangeAuthor,
    ) -> AssociationResult<Association> {
        validate_new(&data)?;

        let mut association = data.into_association(new_id(), author);
        let draft = ChangeDraft::new(
            EntityType::Association,
            &association.id,
            ChangeType::Create,
            author.clone(),
            format!(
                "{} {} {}",
                association.subject.name, association.involvement_type, association.object.name
            ),
        )
        .changes(creation_changes(&association))
        .expect_version(1);

        {
            // Held across the append so the CREATE record, row and indexes appear together
            let mut rows = self.rows.write();
            let mut indexes = self.indexes.write();
            let record = self.ledger.append(draft)?;
            association.apply_record(&record);
            rows.insert(
                association.id.clone(),
                Arc::new(Mutex::new(association.clone())),
            );
            indexes
                .by_subject
                .entry(association.subject.id.clone())
                .or_default()
                .push(association.id.clone());
            indexes
                .by_object
                .entry(association.object.id.clone())
                .or_default()
                .push(association.id.clone());
        }

        tracing::info!(
            association_id = %association.id,
            subject = %association.subject.id,
            object = %association.object.id,
            involvement = %association.involvement_type,
            "Association created"
        );

        self.notify_created(&association, author);
        Ok(association)
    }

    fn notify_created(&self, association: &Association, author: &ChangeAuthor) {
        self.notify(association, |observer| {
            observer.on_association_created(association, author, self)
        });
    }

    fn notify_reactivated(&self, association: &Association, author: &ChangeAuthor) {
        self.notify(association, |observer| {
            observer.on_association_reactivated(association, author, self)
        });
    }

    fn notify(
        &self,
        association: &Association,
        run: impl Fn(&dyn AssociationObserver) -> AssociationResult<()>,
    ) {
        let observers: Vec<_> = self.observers.read().clone();
        for observer in observers {
            match run(observer.as_ref()) {
                Ok(()) => {
                    tracing::debug!(observer = observer.name(), "Association observer ran");
                }
                Err(e) => {
                    tracing::error!(
                        observer = observer.name(),
                        association_id = %association.id,
                        error = %e,
                        "Association observer failed"
                    );
                }
            }
        }
    }

    /// Record a discrete action under an association
    ///
    /// Appends one UPDATE record against the parent association whose single
    /// field change adds the new involvement record.
    pub fn record_involvement(
        &self,
        association_id: &str,
        action: &str,
        details: &str,
        author: &ChangeAuthor,
        extra: InvolvementExtra,
    ) -> AssociationResult<InvolvementRecord> {
        if action.trim().is_empty() {
            return Err(AssociationError::Validation("action cannot be empty".to_string()));
        }

        let cell = self
            .cell(association_id)
            .ok_or_else(|| AssociationError::NotFound(association_id.to_string()))?;
        let mut association = cell.lock();

        let mut involvement =
            InvolvementRecord::new(new_id(), association_id, action, details, author, extra)?;
        let value = serde_json::to_value(&involvement)?;

        let draft = ChangeDraft::new(
            EntityType::Association,
            association_id,
            ChangeType::Update,
            author.clone(),
            format!("{}: {}", action, details),
        )
        .change(FieldChange::new(
            INVOLVEMENT_FIELD,
            None,
            Some(FieldValue::Record(value)),
        ))
        .expect_version(association.version + 1);

        let record = self.ledger.append(draft)?;
        involvement.change_history.push(record.change_id.clone());
        association.involvement_records.push(involvement.clone());
        association.apply_record(&record);

        tracing::info!(
            association_id = %association_id,
            involvement_id = %involvement.id,
            action = %action,
            "Involvement recorded"
        );
        Ok(involvement)
    }

    /// Versioned update of the mutable association fields
    ///
    /// Observers are told when the update reactivates the association.
    pub fn update_association(
        &self,
        id: &str,
        updates: AssociationUpdate,
        author: &ChangeAuthor,
        reason: &str,
    ) -> AssociationResult<Association> {
        let cell = self
            .cell(id)
            .ok_or_else(|| AssociationError::NotFound(id.to_string()))?;
        let mut current = cell.lock();

        let mut next = current.clone();
        updates.apply_to(&mut next);
        validate_window(&next)?;

        let draft = ChangeDraft::new(EntityType::Association, id, ChangeType::Update, author.clone(), reason)
            .changes(diff_fields(&*current, &next))
            .expect_version(current.version + 1);
        let record = self.ledger.append(draft)?;
        next.apply_record(&record);
        let reactivated = !current.is_active && next.is_active;
        *current = next.clone();
        drop(current);

        tracing::info!(association_id = %id, version = next.version, "Association updated");
        if reactivated {
            self.notify_reactivated(&next, author);
        }
        Ok(next)
    }

    pub fn get_association(&self, id: &str) -> AssociationResult<Association> {
        self.cell(id)
            .map(|cell| cell.lock().clone())
            .ok_or_else(|| AssociationError::NotFound(id.to_string()))
    }

    pub fn get_associations_for_subject(&self, subject_id: &str) -> Vec<Association> {
        let ids = self
            .indexes
            .read()
            .by_subject
            .get(subject_id)
            .cloned()
            .unwrap_or_default();
        self.materialize(&ids)
    }

    pub fn get_associations_for_object(&self, object_id: &str) -> Vec<Association> {
        let ids = self
            .indexes
            .read()
            .by_object
            .get(object_id)
            .cloned()
            .unwrap_or_default();
        self.materialize(&ids)
    }

    /// Union of subject- and object-indexed associations, each once
    pub fn get_associations_for_entity(&self, entity_id: &str) -> Vec<Association> {
        let ids: Vec<String> = {
            let indexes = self.indexes.read();
            let mut ids: Vec<String> = indexes
                .by_subject
                .get(entity_id)
                .cloned()
                .unwrap_or_default();
            if let Some(object_ids) = indexes.by_object.get(entity_id) {
                for id in object_ids {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
            }
            ids
        };
        self.materialize(&ids)
    }

    /// True if the id appears at either end of any association
    pub fn is_indexed(&self, entity_id: &str) -> bool {
        let indexes = self.indexes.read();
        indexes.by_subject.contains_key(entity_id) || indexes.by_object.contains_key(entity_id)
    }

    pub fn search_associations(&self, criteria: &AssociationCriteria) -> Vec<AssociationSummary> {
        let cells: Vec<_> = self.rows.read().values().cloned().collect();
        let mut results: Vec<AssociationSummary> = cells
            .iter()
            .map(|cell| cell.lock().clone())
            .filter(|a| criteria.matches(a))
            .map(|a| AssociationSummary::from(&a))
            .collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        results
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, id: &str) -> Option<Arc<Mutex<Association>>> {
        self.rows.read().get(id).cloned()
    }

    fn materialize(&self, ids: &[String]) -> Vec<Association> {
        ids.iter()
            .filter_map(|id| self.cell(id))
            .map(|cell| cell.lock().clone())
            .collect()
    }
}

fn validate_new(data: &NewAssociation) -> AssociationResult<()> {
    if data.subject.id.trim().is_empty() || data.object.id.trim().is_empty() {
        return Err(AssociationError::Validation(
            "subject and object ids are required".to_string(),
        ));
    }
    if !data.subject.kind.is_registered() {
        return Err(AssociationError::Validation(format!(
            "subject must be a person or organization, got {}",
            data.subject.kind
        )));
    }
    if data.subject.id == data.object.id {
        return Err(AssociationError::Validation(
            "an entity cannot be associated with itself".to_string(),
        ));
    }
    if data
        .financial_value
        .is_some_and(|v| v.is_sign_negative() && !v.is_zero())
    {
        return Err(AssociationError::Validation(
            "financial_value cannot be negative".to_string(),
        ));
    }
    if let Some(end) = data.end_date {
        if end < data.start_date {
            return Err(AssociationError::Validation(
                "end_date precedes start_date".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_window(association: &Association) -> AssociationResult<()> {
    if let Some(end) = association.end_date {
        if end < association.start_date {
            return Err(AssociationError::Validation(
                "end_date precedes start_date".to_string(),
            ));
        }
    }
    Ok(())
}
