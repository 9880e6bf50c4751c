//! MNA matrix assembly.

use std::collections::HashMap;

use crate::circuit::{Circuit, ComponentId, NodeId, PortId};
use crate::components::Component;
use crate::error::Result;

use super::elimination::solve_dense;

/// Unknown numbering for one step.
///
/// Node voltages come first, in [`Circuit::list_nodes`] order, followed by
/// one branch current per voltage source in declaration order. Ground has no
/// index. The layout is rebuilt from the current topology on every step.
#[derive(Debug, Clone)]
pub struct MnaLayout {
    /// Non-ground nodes; position is the unknown index
    pub nodes: Vec<NodeId>,
    /// Voltage sources; position k owns unknown `nodes.len() + k`
    pub sources: Vec<ComponentId>,
    node_index: HashMap<NodeId, usize>,
}

impl MnaLayout {
    pub fn new(circuit: &Circuit) -> Self {
        let nodes = circuit.list_nodes();
        let node_index = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        let sources = circuit
            .components()
            .iter()
            .filter(|c| matches!(c, Component::VoltageSource(_)))
            .map(Component::id)
            .collect();
        Self {
            nodes,
            sources,
            node_index,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_branches(&self) -> usize {
        self.sources.len()
    }

    /// Get the total size of the MNA solution vector.
    pub fn matrix_size(&self) -> usize {
        self.num_nodes() + self.num_branches()
    }

    /// Get the matrix index for a node voltage.
    /// Returns None for ground.
    pub fn node_index(&self, node: NodeId) -> Option<usize> {
        if node.is_ground() {
            None
        } else {
            self.node_index.get(&node).copied()
        }
    }

    /// Matrix index of the node a port sits on.
    pub fn port_index(&self, circuit: &Circuit, port: PortId) -> Option<usize> {
        circuit
            .nets()
            .node_of(port)
            .and_then(|node| self.node_index(node))
    }

    /// Get the matrix index for the k-th voltage source's branch current.
    pub fn branch_index(&self, k: usize) -> usize {
        self.num_nodes() + k
    }
}

/// MNA matrix system Ax = z.
#[derive(Debug, Clone, PartialEq)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            size,
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at index br.
    /// V[n+] - V[n-] = E
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        voltage: f64,
    ) {
        if let Some(i) = n_pos {
            self.add(i, br, 1.0);
            self.add(br, i, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(j, br, -1.0);
            self.add(br, j, -1.0);
        }
        self.z[br] = voltage;
    }

    /// Stamp a current injected into n_pos and drawn from n_neg.
    pub fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        if let Some(i) = n_pos {
            self.add_source(i, current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, -current);
        }
    }

    /// Solve Ax = z by Gaussian elimination with partial pivoting.
    pub fn solve(&self, pivot_tolerance: f64) -> Result<Vec<f64>> {
        solve_dense(&self.a, &self.z, self.size, pivot_tolerance)
    }
}

/// Build the layout and stamp every component for a step of length `dt`.
pub fn assemble(circuit: &Circuit, dt: f64) -> (MnaLayout, MnaMatrix) {
    let layout = MnaLayout::new(circuit);
    let mut matrix = MnaMatrix::new(layout.matrix_size());
    let idx = |port: PortId| layout.port_index(circuit, port);
    let mut branch = 0;

    for component in circuit.components() {
        match component {
            Component::Resistor(r) => {
                matrix.stamp_conductance(idx(r.ports[0]), idx(r.ports[1]), r.conductance());
            }

            Component::Lamp(l) => {
                matrix.stamp_conductance(idx(l.ports[0]), idx(l.ports[1]), l.conductance());
            }

            Component::Capacitor(c) => {
                let n1 = idx(c.ports[0]);
                let n2 = idx(c.ports[1]);
                matrix.stamp_conductance(n1, n2, c.conductance(dt));
                // Companion current source carries last step's voltage
                matrix.stamp_current_source(n1, n2, c.current_source(dt));
            }

            Component::CurrentSource(i) => {
                matrix.stamp_current_source(idx(i.ports[0]), idx(i.ports[1]), i.current);
            }

            Component::VoltageSource(v) => {
                let br = layout.branch_index(branch);
                branch += 1;
                matrix.stamp_voltage_source(idx(v.ports[0]), idx(v.ports[1]), br, v.voltage);
            }

            // Reference, short-by-identity and infinite-impedance meters
            Component::Ground(_) | Component::Wire(_) | Component::Probe(_) => {}
        }
    }

    (layout, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ProbeChannel;
    use approx::assert_relative_eq;

    #[test]
    fn test_resistor_stamp() {
        let mut circuit = Circuit::new();
        let r = circuit.add_resistor(500.0);
        let (layout, m) = assemble(&circuit, 0.1);
        assert_eq!(layout.matrix_size(), 2);
        assert_relative_eq!(m.get(0, 0), 0.002);
        assert_relative_eq!(m.get(1, 1), 0.002);
        assert_relative_eq!(m.get(0, 1), -0.002);
        assert_relative_eq!(m.get(1, 0), -0.002);

        circuit.ground(circuit.port(r, 1).unwrap()).unwrap();
        let (layout, m) = assemble(&circuit, 0.1);
        assert_eq!(layout.matrix_size(), 1);
        assert_relative_eq!(m.get(0, 0), 0.002);
    }

    #[test]
    fn test_voltage_source_rows_follow_nodes() {
        let mut circuit = Circuit::new();
        let v1 = circuit.add_voltage_source(3.0);
        let v2 = circuit.add_voltage_source(7.0);
        circuit.ground(circuit.port(v1, 1).unwrap()).unwrap();
        circuit.ground(circuit.port(v2, 1).unwrap()).unwrap();

        let (layout, m) = assemble(&circuit, 1.0);
        assert_eq!(layout.num_nodes(), 2);
        assert_eq!(layout.sources, vec![v1, v2]);
        assert_eq!(layout.branch_index(0), 2);
        assert_eq!(m.z, vec![0.0, 0.0, 3.0, 7.0]);
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(2, 0), 1.0);
        assert_eq!(m.get(1, 3), 1.0);
        assert_eq!(m.get(3, 1), 1.0);
    }

    #[test]
    fn test_current_source_sign() {
        let mut circuit = Circuit::new();
        circuit.add_current_source(0.25);
        let (_, m) = assemble(&circuit, 1.0);
        assert_eq!(m.z, vec![0.25, -0.25]);
    }

    #[test]
    fn test_capacitor_companion_stamp() {
        let mut circuit = Circuit::new();
        let c = circuit.add_capacitor(1e-3);
        circuit.ground(circuit.port(c, 1).unwrap()).unwrap();
        if let Some(Component::Capacitor(cap)) = circuit.component_mut(c) {
            cap.v_prev = 4.0;
        }

        let (_, m) = assemble(&circuit, 0.01);
        // G_eq = 0.1 S, I_eq = 0.4 A
        assert_relative_eq!(m.get(0, 0), 0.1);
        assert_relative_eq!(m.z[0], 0.4);
    }

    #[test]
    fn test_probe_ground_and_wire_are_not_stamped() {
        let mut circuit = Circuit::new();
        circuit.add_probe(ProbeChannel::B);
        circuit.add_wire();
        circuit.add_ground();
        let (layout, m) = assemble(&circuit, 1.0);
        assert_eq!(layout.matrix_size(), 3);
        assert!(m.a.iter().all(|v| *v == 0.0));
        assert!(m.z.iter().all(|v| *v == 0.0));
    }
}
