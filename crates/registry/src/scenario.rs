//! Scenario files - scripted registry mutations with symbolic aliases
//!
//! A scenario is a JSON document with a default author and an ordered list of
//! steps. Entities and associations created by a step can be given an alias
//! that later steps (and CLI arguments) use in place of the generated id.

use civic_associations::{AssociationUpdate, EntityRef, InvolvementExtra, InvolvementType, NewAssociation, Significance};
use civic_core::{ChangeAuthor, EntityKind, OwnerKind, OwnershipStake};
use civic_entities::{NewOrganization, NewPerson, OrganizationType, OrganizationUpdate, PersonUpdate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{RegistryError, RegistryResult};
use crate::registry::Registry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Author of every step that does not name its own
    #[serde(default = "ChangeAuthor::system")]
    pub author: ChangeAuthor,
    pub steps: Vec<Step>,
}

/// Owner of a stake, by alias or raw id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeSpec {
    pub owner: String,
    pub percentage: Decimal,
    #[serde(default = "default_true")]
    pub voting_rights: bool,
}

/// Association object: an alias of a registered entity or an external reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectSpec {
    Alias(String),
    External(EntityRef),
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    RegisterPerson {
        alias: String,
        person: NewPerson,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    RegisterOrganization {
        alias: String,
        legal_name: String,
        #[serde(default)]
        organization_type: OrganizationType,
        #[serde(default)]
        stakes: Vec<StakeSpec>,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    UpdatePerson {
        target: String,
        updates: PersonUpdate,
        reason: String,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    UpdateOrganization {
        target: String,
        updates: OrganizationUpdate,
        reason: String,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    SetOwnership {
        target: String,
        stakes: Vec<StakeSpec>,
        reason: String,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    Associate {
        #[serde(default)]
        alias: Option<String>,
        subject: String,
        object: ObjectSpec,
        involvement_type: InvolvementType,
        #[serde(default)]
        significance: Significance,
        #[serde(default)]
        financial_value: Option<Decimal>,
        #[serde(default = "default_true")]
        is_active: bool,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    UpdateAssociation {
        target: String,
        updates: AssociationUpdate,
        reason: String,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
    Involvement {
        association: String,
        action: String,
        #[serde(default)]
        details: String,
        #[serde(default)]
        amount: Option<Decimal>,
        #[serde(default)]
        author: Option<ChangeAuthor>,
    },
}

impl Step {
    fn author(&self) -> Option<&ChangeAuthor> {
        match self {
            Step::RegisterPerson { author, .. }
            | Step::RegisterOrganization { author, .. }
            | Step::UpdatePerson { author, .. }
            | Step::UpdateOrganization { author, .. }
            | Step::SetOwnership { author, .. }
            | Step::Associate { author, .. }
            | Step::UpdateAssociation { author, .. }
            | Step::Involvement { author, .. } => author.as_ref(),
        }
    }
}

/// Alias table produced by applying a scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub aliases: BTreeMap<String, String>,
    pub steps_applied: usize,
}

impl ScenarioRun {
    /// Id behind an alias; unknown keys are taken as raw ids
    pub fn resolve(&self, key: &str) -> String {
        self.aliases
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn bind(&mut self, alias: &str, id: &str) -> RegistryResult<()> {
        if self.aliases.contains_key(alias) {
            return Err(RegistryError::Scenario(format!("alias '{}' defined twice", alias)));
        }
        self.aliases.insert(alias.to_string(), id.to_string());
        Ok(())
    }
}

impl Scenario {
    pub fn from_file(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply every step in order, stopping at the first failure
    pub fn apply(&self, registry: &Registry) -> RegistryResult<ScenarioRun> {
        let mut run = ScenarioRun::default();
        for (index, step) in self.steps.iter().enumerate() {
            let author = step.author().unwrap_or(&self.author);
            apply_step(registry, &mut run, step, author).map_err(|e| {
                tracing::error!(step = index, error = %e, "Scenario step failed");
                e
            })?;
            run.steps_applied += 1;
        }
        tracing::info!(steps = run.steps_applied, aliases = run.aliases.len(), "Scenario applied");
        Ok(run)
    }
}

fn apply_step(
    registry: &Registry,
    run: &mut ScenarioRun,
    step: &Step,
    author: &ChangeAuthor,
) -> RegistryResult<()> {
    match step {
        Step::RegisterPerson { alias, person, .. } => {
            let person = registry.register_person(person.clone(), author)?;
            run.bind(alias, &person.id)?;
        }
        Step::RegisterOrganization {
            alias,
            legal_name,
            organization_type,
            stakes,
            ..
        } => {
            let mut data = NewOrganization::new(legal_name.clone()).organization_type(*organization_type);
            for stake in resolve_stakes(registry, run, stakes)? {
                data = data.stake(stake);
            }
            let organization = registry.register_organization(data, author)?;
            run.bind(alias, &organization.id)?;
        }
        Step::UpdatePerson {
            target,
            updates,
            reason,
            ..
        } => {
            registry.update_person(&run.resolve(target), updates.clone(), author, reason)?;
        }
        Step::UpdateOrganization {
            target,
            updates,
            reason,
            ..
        } => {
            registry.update_organization(&run.resolve(target), updates.clone(), author, reason)?;
        }
        Step::SetOwnership {
            target,
            stakes,
            reason,
            ..
        } => {
            let stakes = resolve_stakes(registry, run, stakes)?;
            registry.set_ownership(&run.resolve(target), stakes, author, reason)?;
        }
        Step::Associate {
            alias,
            subject,
            object,
            involvement_type,
            significance,
            financial_value,
            is_active,
            ..
        } => {
            let subject = registry.entity_ref(&run.resolve(subject))?;
            let object = match object {
                ObjectSpec::Alias(key) => registry.entity_ref(&run.resolve(key))?,
                ObjectSpec::External(reference) => reference.clone(),
            };
            let mut data = NewAssociation::new(subject, object, *involvement_type);
            data.significance = *significance;
            data.financial_value = *financial_value;
            data.is_active = *is_active;

            let association = registry.create_association(data, author)?;
            if let Some(alias) = alias {
                run.bind(alias, &association.id)?;
            }
        }
        Step::UpdateAssociation {
            target,
            updates,
            reason,
            ..
        } => {
            registry.update_association(&run.resolve(target), updates.clone(), author, reason)?;
        }
        Step::Involvement {
            association,
            action,
            details,
            amount,
            ..
        } => {
            let extra = InvolvementExtra {
                amount: *amount,
                ..InvolvementExtra::default()
            };
            registry.record_involvement(&run.resolve(association), action, details, author, extra)?;
        }
    }
    Ok(())
}

fn resolve_stakes(
    registry: &Registry,
    run: &ScenarioRun,
    stakes: &[StakeSpec],
) -> RegistryResult<Vec<OwnershipStake>> {
    stakes
        .iter()
        .map(|spec| {
            let owner_id = run.resolve(&spec.owner);
            let owner_kind = match registry.entity_ref(&owner_id)?.kind {
                EntityKind::Person => OwnerKind::Person,
                _ => OwnerKind::Organization,
            };
            Ok(OwnershipStake::new(
                owner_id,
                owner_kind,
                spec.percentage,
                spec.voting_rights,
            )?)
        })
        .collect()
}
