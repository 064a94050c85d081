//! Network graph for visualization

use civic_associations::{Association, InvolvementType};
use civic_core::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    /// Hops from the center
    pub depth: usize,
    pub connection_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub association_id: String,
    pub source: String,
    pub target: String,
    pub involvement_type: InvolvementType,
    pub weight: f64,
    pub is_active: bool,
}

impl From<&Association> for NetworkEdge {
    fn from(association: &Association) -> Self {
        Self {
            association_id: association.id.clone(),
            source: association.subject.id.clone(),
            target: association.object.id.clone(),
            involvement_type: association.involvement_type,
            weight: if association.significance.is_primary() {
                1.0
            } else {
                0.5
            },
            is_active: association.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    pub center: String,
    pub depth: usize,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

impl NetworkGraph {
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
