//! Writing a solution back onto the circuit.

use std::collections::HashMap;

use crate::circuit::{Circuit, ComponentId, NodeId, PortId};
use crate::components::Component;

use super::mna::MnaLayout;

/// Node voltages and source currents read from a solution vector.
///
/// `None` stands for a failed solve: every entry reads zero.
pub(crate) fn read_solution(
    layout: &MnaLayout,
    x: Option<&[f64]>,
) -> (HashMap<NodeId, f64>, HashMap<ComponentId, f64>) {
    let value = |i: usize| x.map_or(0.0, |x| x[i]);

    let voltages = layout
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (*node, value(i)))
        .collect();

    let currents = layout
        .sources
        .iter()
        .enumerate()
        .map(|(k, id)| (*id, value(layout.branch_index(k))))
        .collect();

    (voltages, currents)
}

/// Update derived component state from solved node voltages.
///
/// Only call this after a successful solve; a singular step must leave
/// capacitor memory and meter readings untouched.
pub(crate) fn update_states(circuit: &mut Circuit, voltages: &HashMap<NodeId, f64>) {
    let nets = &circuit.nets;
    let potential = |port: PortId| {
        nets.node_of(port)
            .and_then(|node| voltages.get(&node).copied())
            .unwrap_or(0.0)
    };
    let across = |ports: &[PortId; 2]| potential(ports[0]) - potential(ports[1]);

    for component in circuit.components.iter_mut() {
        match component {
            Component::Capacitor(c) => {
                let v = across(&c.ports);
                c.update_state(v);
            }
            Component::Lamp(l) => {
                let v = across(&l.ports);
                l.update_state(v);
            }
            Component::Probe(p) => {
                let v = across(&p.ports);
                p.update_state(v);
            }
            Component::Resistor(_)
            | Component::VoltageSource(_)
            | Component::CurrentSource(_)
            | Component::Ground(_)
            | Component::Wire(_) => {}
        }
    }
}
