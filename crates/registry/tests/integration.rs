//! Cross-crate scenarios

use civic_associations::{EntityRef, InvolvementType, NewAssociation};
use civic_conflict::{ConflictStatus, ConflictType, Severity};
use civic_core::{ChangeAuthor, EntityKind, EntityType, FieldChange, OwnershipStake};
use civic_entities::{NewOrganization, NewPerson, PersonCriteria, PersonUpdate};
use civic_history::{HistoryQuery, PageRequest};
use civic_registry::{Registry, RegistryConfig, Scenario};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;
use std::thread;

fn alice() -> ChangeAuthor {
    ChangeAuthor::new("A", "Alice")
}

fn bob() -> ChangeAuthor {
    ChangeAuthor::new("B", "Bob")
}

fn org_ref(registry: &Registry, id: &str) -> EntityRef {
    registry.entity_ref(id).unwrap()
}

#[test]
fn test_append_only_chain() {
    let registry = Registry::in_memory();
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();

    let mut seen: Vec<String> = Vec::new();
    for score in 1..=4 {
        let update = PersonUpdate {
            reputation_score: Some(score * 10),
            ..PersonUpdate::default()
        };
        registry.update_person(&person.id, update, &alice(), "score").unwrap();

        let hashes: Vec<String> = registry
            .ledger()
            .records_for(EntityType::Person, &person.id)
            .iter()
            .map(|r| r.commit_hash.clone())
            .collect();
        assert!(hashes.starts_with(&seen), "earlier hashes must be preserved in order");
        seen = hashes;
    }

    let records = registry.ledger().records_for(EntityType::Person, &person.id);
    assert!(records[0].parent_commit_hash.is_none());
    for pair in records.windows(2) {
        assert_eq!(pair[1].parent_commit_hash.as_ref(), Some(&pair[0].commit_hash));
    }
    assert_eq!(registry.verify_all().unwrap(), 1);
}

#[test]
fn test_version_monotonicity() {
    let registry = Registry::in_memory();
    let org = registry
        .register_organization(NewOrganization::new("Acme"), &alice())
        .unwrap();

    let updates = 7;
    for i in 0..updates {
        registry
            .update_organization(
                &org.id,
                civic_entities::OrganizationUpdate::legal_name(format!("Acme {}", i)),
                &alice(),
                "rename",
            )
            .unwrap();
    }

    let org = registry.get_organization(&org.id).unwrap();
    assert_eq!(org.version, updates + 1);
    assert_eq!(org.audit.total_changes, updates + 1);
}

#[test]
fn test_blame_completeness() {
    let registry = Registry::in_memory();
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();
    registry
        .update_person(&person.id, PersonUpdate::legal_name("Jane R. Doe"), &bob(), "name change")
        .unwrap();

    let blame = registry.blame(EntityType::Person, &person.id).unwrap();
    let name = &blame.field_blame["legal_name"];
    assert_eq!(name.last_changed_by, bob());
    assert_eq!(name.contributors, BTreeSet::from(["A".to_string(), "B".to_string()]));
    assert_eq!(blame.overall_responsibility.len(), 2);
}

#[test]
fn test_diff_range_is_union_of_steps() {
    let registry = Registry::in_memory();
    let person = registry
        .register_person(NewPerson::new("Jane Doe").region("CA"), &alice())
        .unwrap();
    registry
        .update_person(&person.id, PersonUpdate::legal_name("Jane R. Doe"), &bob(), "name")
        .unwrap();
    registry
        .update_person(
            &person.id,
            PersonUpdate {
                preferred_name: Some(Some("JR".to_string())),
                regions: Some(vec!["NY".to_string()]),
                ..PersonUpdate::default()
            },
            &alice(),
            "moved",
        )
        .unwrap();

    let n = registry.ledger().chain_len(EntityType::Person, &person.id);
    let full = registry.diff(EntityType::Person, &person.id, 0, n).unwrap();
    let stepped: Vec<FieldChange> = (0..n)
        .flat_map(|i| {
            registry
                .diff(EntityType::Person, &person.id, i, i + 1)
                .unwrap()
                .changes
        })
        .collect();
    assert_eq!(full.changes, stepped);
    assert!(full.added_fields.contains("preferred_name"));
    assert_eq!(full.authors.len(), 2);

    let out_of_range = registry.diff(EntityType::Person, &person.id, 5, 9).unwrap();
    assert!(out_of_range.is_empty());
    assert_eq!(out_of_range.from_commit_hash, "");
}

#[test]
fn test_cycle_safety() {
    let registry = Registry::in_memory();
    let x = registry.register_organization(NewOrganization::new("X"), &alice()).unwrap();
    let y = registry
        .register_organization(
            NewOrganization::new("Y").stake(OwnershipStake::organization(&x.id, dec!(50)).unwrap()),
            &alice(),
        )
        .unwrap();
    registry
        .set_ownership(
            &x.id,
            vec![OwnershipStake::organization(&y.id, dec!(50)).unwrap()],
            &alice(),
            "cross holding",
        )
        .unwrap();

    let owners = registry.ownership_chain(&x.id).unwrap();
    assert!(owners.is_empty());
    let analysis = registry.ownership_analysis(&y.id).unwrap();
    assert_eq!(analysis.circular_references, vec![y.id.clone()]);
}

#[test]
fn test_conflict_detection_scenario() {
    let registry = Registry::in_memory();
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();
    let org_a = registry.register_organization(NewOrganization::new("Org A"), &alice()).unwrap();
    let org_b = registry.register_organization(NewOrganization::new("Org B"), &alice()).unwrap();
    let jane = registry.entity_ref(&person.id).unwrap();

    registry
        .create_association(
            NewAssociation::new(
                jane.clone(),
                org_ref(&registry, &org_a.id),
                InvolvementType::ElectedRepresentative,
            ),
            &alice(),
        )
        .unwrap();
    registry
        .create_association(
            NewAssociation::new(jane, org_ref(&registry, &org_b.id), InvolvementType::Owner)
                .financial_value(dec!(2000000)),
            &alice(),
        )
        .unwrap();

    let conflicts = registry.conflicts_for_person(&person.id);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::OwnershipStake);
    assert_eq!(conflicts[0].severity, Severity::Critical);

    let reviewed = registry
        .transition_conflict(&conflicts[0].id, ConflictStatus::Dismissed, &bob(), None)
        .unwrap();
    assert!(reviewed.status.is_terminal());
    assert_eq!(registry.list_conflicts(Some(ConflictStatus::Detected)).len(), 0);
}

#[test]
fn test_name_index_correctness() {
    let registry = Registry::in_memory();
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();
    registry
        .update_person(&person.id, PersonUpdate::legal_name("Jane R. Doe"), &alice(), "name change")
        .unwrap();

    assert_eq!(registry.search_people(&PersonCriteria::name("Jane R")).len(), 1);
    assert!(registry.search_people(&PersonCriteria::name("Jane Doe")).is_empty());
    assert_eq!(registry.search_people(&PersonCriteria::name("Jane")).len(), 1);
    assert!(registry.find_people_by_name("Jane Doe").is_empty());
}

#[test]
fn test_end_to_end_ownership() {
    let registry = Registry::in_memory();
    let p = registry.register_person(NewPerson::new("P"), &alice()).unwrap();
    let a = registry.register_organization(NewOrganization::new("Org A"), &alice()).unwrap();
    let b = registry
        .register_organization(
            NewOrganization::new("Org B")
                .stake(OwnershipStake::organization(&a.id, dec!(60)).unwrap())
                .stake(OwnershipStake::person(&p.id, dec!(40)).unwrap()),
            &alice(),
        )
        .unwrap();

    let owners = registry.ownership_chain(&b.id).unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].person_id, p.id);
    assert_eq!(owners[0].effective_percentage, dec!(40));
}

#[test]
fn test_network_graph_through_registry() {
    let registry = Registry::in_memory();
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();
    let org = registry.register_organization(NewOrganization::new("Acme"), &alice()).unwrap();
    let jane = registry.entity_ref(&person.id).unwrap();

    registry
        .create_association(
            NewAssociation::new(jane.clone(), org_ref(&registry, &org.id), InvolvementType::BoardMember),
            &alice(),
        )
        .unwrap();
    registry
        .create_association(
            NewAssociation::new(
                jane,
                EntityRef::new("HB-12", EntityKind::Bill, "HB 12"),
                InvolvementType::BillSponsor,
            )
            .primary(),
            &alice(),
        )
        .unwrap();

    let graph = registry.network_graph(&person.id, 1).unwrap();
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.node(&person.id).unwrap().connection_count, 2);

    // External objects can be graph centers once referenced
    let graph = registry.network_graph("HB-12", 1).unwrap();
    assert_eq!(graph.nodes.len(), 2);
}

#[test]
fn test_concurrent_updates_to_one_entity_serialize() {
    let registry = Arc::new(Registry::in_memory());
    let person = registry.register_person(NewPerson::new("Jane Doe"), &alice()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            let id = person.id.clone();
            thread::spawn(move || {
                for j in 0..10 {
                    let update = PersonUpdate {
                        regions: Some(vec![format!("R{}-{}", i, j)]),
                        ..PersonUpdate::default()
                    };
                    registry.update_person(&id, update, &alice(), "region").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let person = registry.get_person(&person.id).unwrap();
    assert_eq!(person.version, 81);
    assert_eq!(
        registry
            .ledger()
            .verify_entity(EntityType::Person, &person.id)
            .unwrap(),
        81
    );
}

#[test]
fn test_created_records_are_readable_from_stores() {
    let registry = Arc::new(Registry::in_memory());
    let writers: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for j in 0..25 {
                    let person = registry
                        .register_person(NewPerson::new(format!("Member {}-{}", i, j)), &alice())
                        .unwrap();
                    let subject = EntityRef::new(&person.id, EntityKind::Person, "Member");
                    registry
                        .create_association(
                            NewAssociation::new(
                                subject.clone(),
                                EntityRef::new("council", EntityKind::Organization, "Council"),
                                InvolvementType::ElectedRepresentative,
                            ),
                            &alice(),
                        )
                        .unwrap();
                    registry
                        .create_association(
                            NewAssociation::new(
                                subject,
                                EntityRef::new(format!("firm-{}-{}", i, j), EntityKind::Organization, "Firm"),
                                InvolvementType::Owner,
                            ),
                            &alice(),
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    // person + two associations + one conflict per iteration
    let expected = 4 * 25 * 4;
    let mut seen = 0;
    while seen < expected {
        let records = registry.ledger().all();
        for record in &records {
            match record.entity_type {
                EntityType::Person => assert!(registry.get_person(&record.entity_id).is_ok()),
                EntityType::Association => {
                    let association = registry.get_association(&record.entity_id).unwrap();
                    assert!(registry
                        .get_associations_for_subject(&association.subject.id)
                        .iter()
                        .any(|a| a.id == association.id));
                }
                EntityType::ConflictOfInterest => {
                    let conflict = registry.get_conflict(&record.entity_id).unwrap();
                    assert!(registry
                        .conflicts_for_person(&conflict.person_id)
                        .iter()
                        .any(|c| c.id == conflict.id));
                }
                _ => {}
            }
        }
        seen = records.len();
    }

    for writer in writers {
        writer.join().unwrap();
    }
    assert_eq!(registry.list_conflicts(None).len(), 100);
}

#[test]
fn test_history_paging_across_entities() {
    let registry = Registry::in_memory();
    for i in 0..5 {
        registry
            .register_person(NewPerson::new(format!("Person {}", i)), &alice())
            .unwrap();
    }
    registry
        .register_organization(NewOrganization::new("Acme"), &bob())
        .unwrap();

    let people = HistoryQuery {
        entity_type: Some(EntityType::Person),
        ..HistoryQuery::default()
    };
    let page = registry.history(&people, &PageRequest::first(3)).unwrap();
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.pagination.total, 5);
    assert!(page.pagination.has_more);

    let contributors = registry.contributors(&HistoryQuery::default());
    assert_eq!(contributors[0].author, alice());
    assert_eq!(contributors[0].change_count, 5);
}

#[test]
fn test_config_and_scenario_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("config.json");
    let mut config_file = std::fs::File::create(&config_path).unwrap();
    write!(
        config_file,
        r#"{{ "conflict": {{ "critical_financial_threshold": "100" }} }}"#
    )
    .unwrap();

    let scenario_path = dir.path().join("scenario.json");
    let mut scenario_file = std::fs::File::create(&scenario_path).unwrap();
    write!(
        scenario_file,
        r#"{{
            "author": {{ "id": "U1", "name": "Clerk" }},
            "steps": [
                {{ "op": "register_person", "alias": "jane", "person": {{ "legal_name": "Jane Doe" }} }},
                {{ "op": "register_organization", "alias": "city", "legal_name": "City Council",
                   "organization_type": "GOVERNMENT_AGENCY" }},
                {{ "op": "register_organization", "alias": "acme", "legal_name": "Acme",
                   "stakes": [ {{ "owner": "jane", "percentage": "25" }} ] }},
                {{ "op": "associate", "subject": "jane", "object": "city",
                   "involvement_type": "ELECTED_REPRESENTATIVE" }},
                {{ "op": "associate", "subject": "jane", "object": "acme",
                   "involvement_type": "INVESTOR", "financial_value": "500" }}
            ]
        }}"#
    )
    .unwrap();

    let config = RegistryConfig::from_file(&config_path).unwrap();
    let registry = Registry::new(config);
    let run = Scenario::from_file(&scenario_path)
        .unwrap()
        .apply(&registry)
        .unwrap();

    let conflicts = registry.conflicts_for_person(&run.resolve("jane"));
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].severity, Severity::Critical);
    assert_eq!(conflicts[0].conflict_type, ConflictType::FinancialInterest);

    let owners = registry.ownership_chain(&run.resolve("acme")).unwrap();
    assert_eq!(owners[0].effective_percentage, dec!(25));
}
