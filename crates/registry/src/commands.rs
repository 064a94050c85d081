//! CLI commands
//!
//! Each command reads from a populated registry and returns the JSON value
//! the binary prints.

use civic_conflict::ConflictStatus;
use civic_core::EntityType;
use civic_history::{HistoryQuery, PageRequest};
use serde_json::{json, Value};

use crate::registry::Registry;
use crate::scenario::ScenarioRun;

pub fn blame(
    registry: &Registry,
    run: &ScenarioRun,
    entity_type: EntityType,
    entity: &str,
) -> Result<Value, anyhow::Error> {
    let result = registry.blame(entity_type, &run.resolve(entity))?;
    Ok(serde_json::to_value(result)?)
}

pub fn diff(
    registry: &Registry,
    run: &ScenarioRun,
    entity_type: EntityType,
    entity: &str,
    from: usize,
    to: usize,
) -> Result<Value, anyhow::Error> {
    let result = registry.diff(entity_type, &run.resolve(entity), from, to)?;
    Ok(serde_json::to_value(result)?)
}

pub fn history(
    registry: &Registry,
    run: &ScenarioRun,
    mut query: HistoryQuery,
    page: PageRequest,
) -> Result<Value, anyhow::Error> {
    query.entity_id = query.entity_id.map(|id| run.resolve(&id));
    let result = registry.history(&query, &page)?;
    Ok(serde_json::to_value(result)?)
}

pub fn conflicts(
    registry: &Registry,
    run: &ScenarioRun,
    person: Option<&str>,
    status: Option<ConflictStatus>,
) -> Result<Value, anyhow::Error> {
    let conflicts = match person {
        Some(person) => registry
            .conflicts_for_person(&run.resolve(person))
            .into_iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect(),
        None => registry.list_conflicts(status),
    };
    Ok(serde_json::to_value(conflicts)?)
}

pub fn ownership(registry: &Registry, run: &ScenarioRun, organization: &str) -> Result<Value, anyhow::Error> {
    let analysis = registry.ownership_analysis(&run.resolve(organization))?;
    Ok(json!({
        "organization_id": analysis.organization_id,
        "identified_percentage": analysis.identified_percentage(),
        "owners": analysis.owners,
        "circular_references": analysis.circular_references,
        "shared_references": analysis.shared_references,
    }))
}

pub fn network(
    registry: &Registry,
    run: &ScenarioRun,
    center: &str,
    depth: usize,
) -> Result<Value, anyhow::Error> {
    let graph = registry.network_graph(&run.resolve(center), depth)?;
    Ok(serde_json::to_value(graph)?)
}

/// Verify every hash chain; a broken chain is reported, not raised
pub fn audit(registry: &Registry) -> Result<Value, anyhow::Error> {
    let records = registry.ledger().len();
    Ok(match registry.verify_all() {
        Ok(chains) => json!({ "status": "ok", "chains": chains, "records": records }),
        Err(e) => json!({ "status": "broken", "records": records, "error": e.to_string() }),
    })
}
