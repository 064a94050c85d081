//! Ownership and network traversal over the entity and association stores

use civic_associations::{AssociationStore, EntityRef};
use civic_core::{EntityKind, OwnerKind};
use civic_entities::EntityStore;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::config::NetworkConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::graph::{NetworkEdge, NetworkGraph, NetworkNode};
use crate::ownership::{BeneficialOwner, OwnershipAnalysis};

pub struct NetworkAnalyzer {
    entities: Arc<EntityStore>,
    associations: Arc<AssociationStore>,
    config: NetworkConfig,
}

/// Accumulator for one ownership traversal
struct OwnershipWalk {
    visited: HashSet<String>,
    on_path: Vec<String>,
    owners: Vec<BeneficialOwner>,
    circular_references: Vec<String>,
    shared_references: Vec<String>,
}

impl NetworkAnalyzer {
    pub fn new(
        entities: Arc<EntityStore>,
        associations: Arc<AssociationStore>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            entities,
            associations,
            config,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Beneficial owners of an organization; cycles are truncated silently
    pub fn ownership_chain(&self, organization_id: &str) -> NetworkResult<Vec<BeneficialOwner>> {
        Ok(self.ownership_analysis(organization_id)?.owners)
    }

    /// Beneficial owners plus the organizations where a cycle was cut
    ///
    /// Depth-first over ownership stakes. An organization already on the
    /// current chain is not expanded again, so percentages flowing around a
    /// cycle are under-counted rather than followed forever. Organizations
    /// reached through more than one acyclic path are expanded on every path.
    pub fn ownership_analysis(&self, organization_id: &str) -> NetworkResult<OwnershipAnalysis> {
        if !self.entities.organization_exists(organization_id) {
            return Err(NetworkError::NotFound {
                kind: EntityKind::Organization,
                id: organization_id.to_string(),
            });
        }

        let mut walk = OwnershipWalk {
            visited: HashSet::new(),
            on_path: Vec::new(),
            owners: Vec::new(),
            circular_references: Vec::new(),
            shared_references: Vec::new(),
        };
        self.walk_ownership(
            organization_id,
            Decimal::ONE_HUNDRED,
            vec![organization_id.to_string()],
            &mut walk,
        );

        if !walk.circular_references.is_empty() {
            tracing::warn!(
                organization_id = %organization_id,
                cycles = ?walk.circular_references,
                "Circular ownership truncated"
            );
        }
        tracing::debug!(
            organization_id = %organization_id,
            owners = walk.owners.len(),
            "Ownership chain resolved"
        );

        Ok(OwnershipAnalysis {
            organization_id: organization_id.to_string(),
            owners: walk.owners,
            circular_references: walk.circular_references,
            shared_references: walk.shared_references,
        })
    }

    fn walk_ownership(
        &self,
        organization_id: &str,
        effective: Decimal,
        path: Vec<String>,
        walk: &mut OwnershipWalk,
    ) {
        if walk.on_path.iter().any(|id| id == organization_id) {
            walk.circular_references.push(organization_id.to_string());
            return;
        }
        if !walk.visited.insert(organization_id.to_string())
            && !walk.shared_references.iter().any(|id| id == organization_id)
        {
            walk.shared_references.push(organization_id.to_string());
        }

        // Stakes may name organizations that were never registered
        let Ok(organization) = self.entities.get_organization(organization_id) else {
            return;
        };

        walk.on_path.push(organization_id.to_string());

        for stake in &organization.ownership {
            let share = effective * stake.percentage / Decimal::ONE_HUNDRED;
            let mut next_path = path.clone();
            next_path.push(stake.owner_id.clone());

            match stake.owner_kind {
                OwnerKind::Person => walk.owners.push(BeneficialOwner {
                    person_id: stake.owner_id.clone(),
                    person_name: self.entities.display_name(&stake.owner_id),
                    effective_percentage: share,
                    path: next_path,
                    voting_rights: stake.voting_rights,
                }),
                OwnerKind::Organization => {
                    self.walk_ownership(&stake.owner_id, share, next_path, walk)
                }
            }
        }
        walk.on_path.pop();
    }

    /// Entities reachable from `center` within `depth` association hops
    pub fn network_graph(&self, center: &str, depth: usize) -> NetworkResult<NetworkGraph> {
        let center_ref = self
            .resolve(center)
            .ok_or_else(|| NetworkError::UnknownEntity(center.to_string()))?;
        let depth = self.config.clamp_depth(depth);

        let mut nodes: Vec<NetworkNode> = vec![node(&center_ref, 0)];
        let mut seen_nodes: HashSet<String> = HashSet::from([center.to_string()]);
        let mut edges: Vec<NetworkEdge> = Vec::new();
        let mut seen_edges: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(center.to_string(), 0)]);

        while let Some((id, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            for association in self.associations.get_associations_for_entity(&id) {
                if !seen_edges.insert(association.id.clone()) {
                    continue;
                }
                edges.push(NetworkEdge::from(&association));

                if let Some(other) = association.other_end(&id) {
                    if seen_nodes.insert(other.id.clone()) {
                        nodes.push(node(other, hops + 1));
                        queue.push_back((other.id.clone(), hops + 1));
                    }
                }
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for edge in &edges {
            *counts.entry(edge.source.as_str()).or_default() += 1;
            *counts.entry(edge.target.as_str()).or_default() += 1;
        }
        for node in &mut nodes {
            node.connection_count = counts.get(node.id.as_str()).copied().unwrap_or(0);
        }

        tracing::debug!(
            center = %center,
            depth,
            nodes = nodes.len(),
            edges = edges.len(),
            "Network graph built"
        );
        Ok(NetworkGraph {
            center: center.to_string(),
            depth,
            nodes,
            edges,
        })
    }

    /// Registered entity first, then any association endpoint with this id
    fn resolve(&self, id: &str) -> Option<EntityRef> {
        if let Ok(person) = self.entities.get_person(id) {
            return Some(EntityRef::new(id, EntityKind::Person, person.display_name()));
        }
        if let Ok(organization) = self.entities.get_organization(id) {
            return Some(EntityRef::new(
                id,
                EntityKind::Organization,
                organization.legal_name,
            ));
        }
        self.associations
            .get_associations_for_entity(id)
            .iter()
            .find_map(|a| {
                if a.subject.id == id {
                    Some(a.subject.clone())
                } else if a.object.id == id {
                    Some(a.object.clone())
                } else {
                    None
                }
            })
    }
}

fn node(entity: &EntityRef, depth: usize) -> NetworkNode {
    NetworkNode {
        id: entity.id.clone(),
        kind: entity.kind,
        name: entity.name.clone(),
        depth,
        connection_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_associations::{InvolvementType, NewAssociation};
    use civic_core::{ChangeAuthor, OwnershipStake};
    use civic_entities::{NewOrganization, NewPerson};
    use civic_ledger::ChangeLedger;
    use rust_decimal_macros::dec;

    struct Fixture {
        entities: Arc<EntityStore>,
        associations: Arc<AssociationStore>,
        analyzer: NetworkAnalyzer,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(ChangeLedger::new());
        let entities = Arc::new(EntityStore::new(ledger.clone()));
        let associations = Arc::new(AssociationStore::new(ledger));
        let analyzer = NetworkAnalyzer::new(
            entities.clone(),
            associations.clone(),
            NetworkConfig::default(),
        );
        Fixture {
            entities,
            associations,
            analyzer,
        }
    }

    fn author() -> ChangeAuthor {
        ChangeAuthor::new("U1", "Clerk")
    }

    #[test]
    fn test_nested_ownership_multiplies() {
        let f = fixture();
        let person = f.entities.register_person(NewPerson::new("Pat"), &author()).unwrap();
        let holding = f
            .entities
            .register_organization(
                NewOrganization::new("Holding").stake(OwnershipStake::person(&person.id, dec!(50)).unwrap()),
                &author(),
            )
            .unwrap();
        let target = f
            .entities
            .register_organization(
                NewOrganization::new("Target")
                    .stake(OwnershipStake::organization(&holding.id, dec!(80)).unwrap()),
                &author(),
            )
            .unwrap();

        let owners = f.analyzer.ownership_chain(&target.id).unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].effective_percentage, dec!(40));
        assert_eq!(owners[0].path, vec![target.id.clone(), holding.id.clone(), person.id.clone()]);
        assert_eq!(owners[0].depth(), 2);
        assert_eq!(owners[0].person_name.as_deref(), Some("Pat"));
    }

    #[test]
    fn test_mutual_ownership_terminates() {
        let f = fixture();
        let x = f
            .entities
            .register_organization(NewOrganization::new("X"), &author())
            .unwrap();
        let y = f
            .entities
            .register_organization(
                NewOrganization::new("Y").stake(OwnershipStake::organization(&x.id, dec!(50)).unwrap()),
                &author(),
            )
            .unwrap();
        f.entities
            .set_ownership(
                &x.id,
                vec![OwnershipStake::organization(&y.id, dec!(50)).unwrap()],
                &author(),
                "cross holding",
            )
            .unwrap();

        let analysis = f.analyzer.ownership_analysis(&x.id).unwrap();
        assert!(analysis.owners.is_empty());
        assert_eq!(analysis.circular_references, vec![x.id.clone()]);
        assert!(f.analyzer.ownership_chain(&x.id).unwrap().is_empty());
    }

    #[test]
    fn test_shared_owner_is_not_a_cycle() {
        let f = fixture();
        let person = f.entities.register_person(NewPerson::new("Pat"), &author()).unwrap();
        let common = f
            .entities
            .register_organization(
                NewOrganization::new("Common").stake(OwnershipStake::person(&person.id, dec!(100)).unwrap()),
                &author(),
            )
            .unwrap();
        let left = f
            .entities
            .register_organization(
                NewOrganization::new("Left")
                    .stake(OwnershipStake::organization(&common.id, dec!(100)).unwrap()),
                &author(),
            )
            .unwrap();
        let right = f
            .entities
            .register_organization(
                NewOrganization::new("Right")
                    .stake(OwnershipStake::organization(&common.id, dec!(100)).unwrap()),
                &author(),
            )
            .unwrap();
        let target = f
            .entities
            .register_organization(
                NewOrganization::new("Target")
                    .stake(OwnershipStake::organization(&left.id, dec!(50)).unwrap())
                    .stake(OwnershipStake::organization(&right.id, dec!(50)).unwrap()),
                &author(),
            )
            .unwrap();

        let analysis = f.analyzer.ownership_analysis(&target.id).unwrap();
        assert!(!analysis.has_cycles());
        assert_eq!(analysis.shared_references, vec![common.id.clone()]);
        assert_eq!(analysis.owners.len(), 2);
        assert!(analysis.owners.iter().all(|o| o.person_id == person.id));
        assert_eq!(analysis.identified_percentage(), dec!(100));
    }

    #[test]
    fn test_unknown_organization() {
        let f = fixture();
        assert!(matches!(
            f.analyzer.ownership_chain("missing"),
            Err(NetworkError::NotFound { .. })
        ));
    }

    #[test]
    fn test_network_graph_depth_bound() {
        let f = fixture();
        let p = EntityRef::new("P1", EntityKind::Person, "Jane");
        let a = EntityRef::new("OA", EntityKind::Organization, "Org A");
        let b = EntityRef::new("OB", EntityKind::Organization, "Org B");
        let c = EntityRef::new("OC", EntityKind::Organization, "Org C");

        f.associations
            .create_association(
                NewAssociation::new(p.clone(), a.clone(), InvolvementType::BoardMember).primary(),
                &author(),
            )
            .unwrap();
        f.associations
            .create_association(NewAssociation::new(a.clone(), b.clone(), InvolvementType::Owner), &author())
            .unwrap();
        f.associations
            .create_association(NewAssociation::new(b, c, InvolvementType::Owner), &author())
            .unwrap();

        let graph = f.analyzer.network_graph("P1", 1).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].weight, 1.0);
        assert_eq!(graph.node("P1").unwrap().connection_count, 1);

        let graph = f.analyzer.network_graph("P1", 2).unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.node("OA").unwrap().connection_count, 2);
        assert_eq!(graph.node("OB").unwrap().depth, 2);
        assert_eq!(graph.edges[1].weight, 0.5);

        let graph = f.analyzer.network_graph("P1", 100).unwrap();
        assert_eq!(graph.depth, 5);
        assert_eq!(graph.nodes.len(), 4);
    }

    #[test]
    fn test_network_graph_unknown_center() {
        let f = fixture();
        assert!(matches!(
            f.analyzer.network_graph("nobody", 2),
            Err(NetworkError::UnknownEntity(_))
        ));
    }
}
