//! Circuit validation.
//!
//! The solver never needs these checks: a circuit that fails them simply
//! produces a singular step. They exist so a driver can tell the user why.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{Circuit, NodeId};
use crate::components::Component;
use crate::error::{OhmlabError, Result};

/// Nodes with no DC path to ground.
///
/// Resistors, lamps, capacitors and voltage sources conduct; current sources
/// and probes do not. Nodes are returned in [`Circuit::list_nodes`] order.
pub fn floating_nodes(circuit: &Circuit) -> Vec<NodeId> {
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

    for component in circuit.components() {
        let conducts = matches!(
            component,
            Component::Resistor(_)
                | Component::Lamp(_)
                | Component::Capacitor(_)
                | Component::VoltageSource(_)
        );
        if !conducts {
            continue;
        }
        let nodes: Vec<NodeId> = component
            .ports()
            .iter()
            .filter_map(|p| circuit.nets.node_of(*p))
            .collect();
        if let [a, b] = nodes.as_slice() {
            adjacency.entry(*a).or_default().push(*b);
            adjacency.entry(*b).or_default().push(*a);
        }
    }

    let mut reached = HashSet::from([NodeId::GROUND]);
    let mut queue = VecDeque::from([NodeId::GROUND]);
    while let Some(node) = queue.pop_front() {
        for next in adjacency.get(&node).into_iter().flatten() {
            if reached.insert(*next) {
                queue.push_back(*next);
            }
        }
    }

    circuit
        .list_nodes()
        .into_iter()
        .filter(|n| !reached.contains(n))
        .collect()
}

/// Validate a circuit for simulation.
///
/// Checks:
/// - The circuit has at least one component
/// - All nodes have a path to ground
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    if circuit.is_empty() {
        return Err(OhmlabError::InvalidSimulationParam {
            message: "Circuit has no components".to_string(),
        });
    }

    if let Some(node) = floating_nodes(circuit).into_iter().next() {
        return Err(OhmlabError::FloatingNode { node });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ProbeChannel;

    #[test]
    fn test_grounded_divider_has_no_floating_nodes() {
        let mut circuit = Circuit::new();
        let v = circuit.add_voltage_source(10.0);
        let r = circuit.add_resistor(1000.0);
        circuit
            .connect(circuit.port(v, 0).unwrap(), circuit.port(r, 0).unwrap())
            .unwrap();
        circuit.ground(circuit.port(v, 1).unwrap()).unwrap();
        circuit.ground(circuit.port(r, 1).unwrap()).unwrap();

        assert!(floating_nodes(&circuit).is_empty());
        assert!(validate_circuit(&circuit).is_ok());
    }

    #[test]
    fn test_unconnected_probe_floats() {
        let mut circuit = Circuit::new();
        let r = circuit.add_resistor(1000.0);
        circuit.ground(circuit.port(r, 1).unwrap()).unwrap();
        let probe = circuit.add_probe(ProbeChannel::A);

        let floating = floating_nodes(&circuit);
        assert_eq!(floating.len(), 2);
        let probe_node = circuit.node_of(circuit.port(probe, 0).unwrap()).unwrap();
        assert!(floating.contains(&probe_node));
        assert!(matches!(
            validate_circuit(&circuit),
            Err(OhmlabError::FloatingNode { .. })
        ));
    }

    #[test]
    fn test_current_source_is_not_a_path() {
        let mut circuit = Circuit::new();
        let i = circuit.add_current_source(0.01);
        circuit.ground(circuit.port(i, 1).unwrap()).unwrap();
        assert_eq!(floating_nodes(&circuit).len(), 1);
    }

    #[test]
    fn test_empty_circuit_is_invalid() {
        assert!(validate_circuit(&Circuit::new()).is_err());
    }
}
