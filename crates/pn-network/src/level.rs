//! Junction dependency leveling.
//!
//! A junction depends on every junction that leads one of its inbound paths.
//! Its level is one more than the highest level it depends on; paths with no
//! leading junction count as level 0.

use std::collections::HashMap;

use pn_core::{CompId, PathId};
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::path::{Bundle, Junction, LogicalPath};

/// Assign a level to every junction.
///
/// Each scan resolves at least one junction or fails, so `J` junctions take at
/// most `J` scans. Returns the number of scans used.
pub fn assign_levels(junctions: &mut [Junction], paths: &[LogicalPath]) -> NetworkResult<usize> {
    let slot_of: HashMap<CompId, usize> = junctions
        .iter()
        .enumerate()
        .map(|(i, j)| (j.comp, i))
        .collect();
    for junction in junctions.iter_mut() {
        junction.level = None;
    }

    let mut unresolved = junctions.len();
    let mut scans = 0;
    while unresolved > 0 {
        scans += 1;
        let mut progressed = false;

        for i in 0..junctions.len() {
            if junctions[i].level.is_some() {
                continue;
            }
            if let Some(level) = inbound_level(&junctions[i].inbound, junctions, paths, &slot_of) {
                junctions[i].level = Some(level);
                unresolved -= 1;
                progressed = true;
            }
        }

        if !progressed {
            let stuck: Vec<String> = junctions
                .iter()
                .filter(|j| j.level.is_none())
                .map(|j| j.name.clone())
                .collect();
            return Err(NetworkError::TopologyCycle { junctions: stuck });
        }
    }

    debug!(junctions = junctions.len(), scans, "junction levels assigned");
    Ok(scans)
}

/// `1 + max(inbound levels)`, or `None` while an inbound leader is unresolved.
fn inbound_level(
    inbound: &[PathId],
    junctions: &[Junction],
    paths: &[LogicalPath],
    slot_of: &HashMap<CompId, usize>,
) -> Option<u32> {
    let mut max = 0;
    for path in inbound.iter().filter_map(|id| paths.get(id.slot())) {
        let upstream = match path.leads_from.and_then(|c| slot_of.get(&c)) {
            Some(&k) => junctions[k].level?,
            None => 0,
        };
        max = max.max(upstream);
    }
    Some(max + 1)
}

/// Copy junction levels onto the paths they lead and compute each bundle's
/// maximum level.
pub(crate) fn apply_levels(junctions: &[Junction], paths: &mut [LogicalPath], bundles: &mut [Bundle]) {
    let level_of: HashMap<CompId, u32> = junctions
        .iter()
        .map(|j| (j.comp, j.level.unwrap_or(0)))
        .collect();

    for path in paths.iter_mut() {
        path.level = path
            .leads_from
            .and_then(|c| level_of.get(&c).copied())
            .unwrap_or(0);
    }
    for bundle in bundles.iter_mut() {
        bundle.max_level = junctions
            .iter()
            .filter(|j| j.bundle == bundle.id)
            .filter_map(|j| j.level)
            .max()
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FlowStatus;
    use crate::path::JunctionRole;
    use pn_core::Id;
    use pn_graph::{Channel, ControlState, JunctionKind};

    fn path(index: u32, leads_from: Option<u32>) -> LogicalPath {
        let id = Id::from_index(index);
        LogicalPath {
            id,
            name: format!("P{index}"),
            bundle: Id::from_index(0),
            channel: Channel::Water,
            elements: vec![],
            closed: false,
            control: ControlState::On,
            flow: None,
            flow_owner: id,
            role: JunctionRole::Plain,
            leads_from: leads_from.map(Id::from_index),
            ends_at: None,
            level: 0,
            valve: None,
            virtual_owner: None,
            status: FlowStatus::Unknown,
        }
    }

    fn junction(comp: u32, inbound: &[u32]) -> Junction {
        Junction {
            comp: Id::from_index(comp),
            name: format!("J{comp}"),
            kind: JunctionKind::Converge,
            bundle: Id::from_index(0),
            inbound: inbound.iter().copied().map(Id::from_index).collect(),
            leading: vec![],
            level: None,
        }
    }

    #[test]
    fn worst_case_order_still_bounded() {
        // J12 <- P2 (led by J11) ; J11 <- P1 (led by J10) ; J10 <- P0 (plain)
        // Listed downstream first so each scan resolves only one junction
        let paths = vec![path(0, None), path(1, Some(10)), path(2, Some(11))];
        let mut junctions = vec![junction(12, &[2]), junction(11, &[1]), junction(10, &[0])];

        let scans = assign_levels(&mut junctions, &paths).unwrap();
        assert!(scans <= junctions.len());
        let levels: Vec<_> = junctions.iter().map(|j| j.level.unwrap()).collect();
        assert_eq!(levels, vec![3, 2, 1]);
    }

    #[test]
    fn self_feeding_junction_is_a_cycle() {
        let paths = vec![path(0, Some(5))];
        let mut junctions = vec![junction(5, &[0])];
        let err = assign_levels(&mut junctions, &paths).unwrap_err();
        assert_eq!(
            err,
            NetworkError::TopologyCycle {
                junctions: vec!["J5".into()]
            }
        );
    }
}
