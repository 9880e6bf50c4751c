//! Main simulator interface.

use std::collections::HashMap;

use log::{debug, trace};

use crate::circuit::{Circuit, ComponentId, NodeId, PortId};
use crate::error::{OhmlabError, Result};

use super::mna::assemble;
use super::propagate::{read_solution, update_states};
use super::{DEFAULT_DT, PIVOT_TOLERANCE};

/// Outcome of the linear solve for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The system had a unique solution
    Solved,
    /// The system was singular; all values read zero and no state changed
    Singular,
}

/// Voltages and currents produced by one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub status: SolveStatus,
    /// Potential of every non-ground node
    pub node_voltages: HashMap<NodeId, f64>,
    /// Branch current of every voltage source
    pub source_currents: HashMap<ComponentId, f64>,
}

impl StepResult {
    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    /// Potential of a node; ground and unknown nodes read zero.
    pub fn voltage(&self, node: NodeId) -> f64 {
        self.node_voltages.get(&node).copied().unwrap_or(0.0)
    }

    /// Branch current of a voltage source.
    pub fn current(&self, source: ComponentId) -> Option<f64> {
        self.source_currents.get(&source).copied()
    }
}

/// Advance the circuit by one step of length `dt`.
///
/// Builds the MNA system from the current topology, solves it and writes the
/// new capacitor memory and meter readings back into the components. A
/// singular system is not an error: the result reports zeros with
/// [`SolveStatus::Singular`] and every component keeps its previous state.
///
/// `dt` must be finite and positive; [`Simulator`] checks this, this function
/// does not.
pub fn simulate_step(circuit: &mut Circuit, dt: f64) -> StepResult {
    simulate_step_with_tolerance(circuit, dt, PIVOT_TOLERANCE)
}

/// [`simulate_step`] with an explicit singular-pivot threshold.
pub fn simulate_step_with_tolerance(circuit: &mut Circuit, dt: f64, pivot_tolerance: f64) -> StepResult {
    let (layout, matrix) = assemble(circuit, dt);
    trace!(
        "stamped {} nodes and {} voltage sources",
        layout.num_nodes(),
        layout.num_branches()
    );

    match matrix.solve(pivot_tolerance) {
        Ok(x) => {
            let (node_voltages, source_currents) = read_solution(&layout, Some(&x));
            update_states(circuit, &node_voltages);
            StepResult {
                status: SolveStatus::Solved,
                node_voltages,
                source_currents,
            }
        }
        Err(err) => {
            debug!(
                "{} ({}x{} system); keeping previous component state",
                err, matrix.size, matrix.size
            );
            let (node_voltages, source_currents) = read_solution(&layout, None);
            StepResult {
                status: SolveStatus::Singular,
                node_voltages,
                source_currents,
            }
        }
    }
}

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Step length in seconds.
    pub dt: f64,
    /// Pivot magnitude below which the system counts as singular.
    pub pivot_tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            pivot_tolerance: PIVOT_TOLERANCE,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step length (in seconds).
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the singular-pivot threshold.
    pub fn with_pivot_tolerance(mut self, pivot_tolerance: f64) -> Self {
        self.pivot_tolerance = pivot_tolerance;
        self
    }

    /// Reject a non-finite or non-positive step length or tolerance.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(OhmlabError::InvalidTimeStep { dt: self.dt });
        }
        if !self.pivot_tolerance.is_finite() || self.pivot_tolerance <= 0.0 {
            return Err(OhmlabError::InvalidSimulationParam {
                message: format!("pivot tolerance {} must be positive", self.pivot_tolerance),
            });
        }
        Ok(())
    }
}

/// Fixed-step driver around [`simulate_step`].
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    config: SimulatorConfig,
    /// Simulated time in seconds
    time: f64,
    steps: u64,
    last: Option<StepResult>,
    /// Node of every port when `last` was solved
    last_port_nodes: Vec<NodeId>,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self {
            circuit,
            config: SimulatorConfig::default(),
            time: 0.0,
            steps: 0,
            last: None,
            last_port_nodes: Vec::new(),
        }
    }

    /// Create a new simulator for the given circuit with custom configuration.
    pub fn with_config(circuit: Circuit, config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(circuit)
        })
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Step the simulation once.
    pub fn step(&mut self) -> &StepResult {
        let result =
            simulate_step_with_tolerance(&mut self.circuit, self.config.dt, self.config.pivot_tolerance);
        self.time += self.config.dt;
        self.steps += 1;
        let nets = self.circuit.nets();
        self.last_port_nodes = (0..nets.port_count())
            .map(|i| nets.node_of(PortId(i)).unwrap_or(NodeId::GROUND))
            .collect();
        self.last.insert(result)
    }

    /// Step `steps` times and return the final result.
    pub fn run(&mut self, steps: usize) -> Option<&StepResult> {
        for _ in 0..steps {
            self.step();
        }
        self.last.as_ref()
    }

    /// Result of the most recent step.
    pub fn last_result(&self) -> Option<&StepResult> {
        self.last.as_ref()
    }

    /// Voltage at a port on the most recent step.
    ///
    /// Uses the node the port sat on when that step was solved, so merges made
    /// since then do not change the answer. Ports created after the step read
    /// their current node, which is zero unless it was solved.
    pub fn port_voltage(&self, port: PortId) -> Result<f64> {
        let current = self.circuit.node_of(port)?;
        let node = self.last_port_nodes.get(port.0).copied().unwrap_or(current);
        Ok(self.last.as_ref().map_or(0.0, |r| r.voltage(node)))
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Mutable access for edits between steps.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Component, ProbeChannel};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn link(circuit: &mut Circuit, a: (ComponentId, usize), b: (ComponentId, usize)) {
        let pa = circuit.port(a.0, a.1).unwrap();
        let pb = circuit.port(b.0, b.1).unwrap();
        circuit.connect(pa, pb).unwrap();
    }

    fn to_ground(circuit: &mut Circuit, c: ComponentId, index: usize) {
        let p = circuit.port(c, index).unwrap();
        circuit.ground(p).unwrap();
    }

    fn reading(circuit: &Circuit, id: ComponentId) -> f64 {
        circuit.component(id).and_then(Component::reading).unwrap()
    }

    /// V -- R1 -- R2 -- GND with probe A across R2.
    fn divider(v: f64, r1: f64, r2: f64) -> (Circuit, ComponentId, ComponentId) {
        let mut circuit = Circuit::new();
        let vs = circuit.add_voltage_source(v);
        let ra = circuit.add_resistor(r1);
        let rb = circuit.add_resistor(r2);
        let probe = circuit.add_probe(ProbeChannel::A);
        circuit.add_ground();

        link(&mut circuit, (vs, 0), (ra, 0));
        link(&mut circuit, (ra, 1), (rb, 0));
        to_ground(&mut circuit, rb, 1);
        to_ground(&mut circuit, vs, 1);
        link(&mut circuit, (probe, 0), (ra, 1));
        to_ground(&mut circuit, probe, 1);
        (circuit, vs, probe)
    }

    /// V -- R -- C -- GND with probe A across C.
    fn rc(v: f64, r: f64, c: f64) -> (Circuit, ComponentId, ComponentId) {
        let mut circuit = Circuit::new();
        let vs = circuit.add_voltage_source(v);
        let res = circuit.add_resistor(r);
        let cap = circuit.add_capacitor(c);
        let probe = circuit.add_probe(ProbeChannel::A);

        link(&mut circuit, (vs, 0), (res, 0));
        link(&mut circuit, (res, 1), (cap, 0));
        to_ground(&mut circuit, cap, 1);
        to_ground(&mut circuit, vs, 1);
        link(&mut circuit, (probe, 0), (cap, 0));
        to_ground(&mut circuit, probe, 1);
        (circuit, cap, probe)
    }

    #[test]
    fn test_voltage_divider() {
        let (mut circuit, vs, probe) = divider(10.0, 1000.0, 4000.0);
        let result = simulate_step(&mut circuit, 0.02);

        assert!(result.is_solved());
        assert_relative_eq!(reading(&circuit, probe), 8.0, epsilon = 1e-9);
        // 2 mA flows out of the + terminal, so the branch current is negative
        assert_relative_eq!(result.current(vs).unwrap(), -0.002, epsilon = 1e-12);
    }

    #[test]
    fn test_current_divider() {
        let mut circuit = Circuit::new();
        let is = circuit.add_current_source(0.01);
        let r1 = circuit.add_resistor(1000.0);
        let r2 = circuit.add_resistor(2000.0);
        let probe = circuit.add_probe(ProbeChannel::A);

        link(&mut circuit, (is, 0), (r1, 0));
        link(&mut circuit, (is, 0), (r2, 0));
        to_ground(&mut circuit, r1, 1);
        to_ground(&mut circuit, r2, 1);
        to_ground(&mut circuit, is, 1);
        link(&mut circuit, (probe, 0), (r1, 0));
        to_ground(&mut circuit, probe, 1);

        let result = simulate_step(&mut circuit, 0.02);
        assert!(result.is_solved());
        assert_relative_eq!(reading(&circuit, probe), 0.01 * 2000.0 / 3.0, epsilon = 1e-9);

        let node = circuit.node_of(circuit.port(r2, 0).unwrap()).unwrap();
        assert_relative_eq!(result.voltage(node), 20.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_capacitor_charging_is_monotonic_and_bounded() {
        let (mut circuit, cap, probe) = rc(5.0, 10_000.0, 1e-3);
        let mut previous = reading(&circuit, cap);
        assert_eq!(previous, 0.0);

        for _ in 0..300 {
            let result = simulate_step(&mut circuit, 0.02);
            assert!(result.is_solved());
            let v = reading(&circuit, cap);
            assert!(v >= previous, "capacitor discharged: {} -> {}", previous, v);
            assert!(v < 5.0, "capacitor overshot: {}", v);
            assert_eq!(reading(&circuit, probe), v);
            previous = v;
        }
        // 6 s into a 10 s time constant
        assert!(previous > 2.0);
    }

    #[test]
    fn test_backward_euler_first_step() {
        let (mut circuit, cap, _) = rc(5.0, 1000.0, 1e-3);
        simulate_step(&mut circuit, 0.1);
        // (5/R) / (1/R + C/dt) = 0.005 / 0.011
        assert_relative_eq!(reading(&circuit, cap), 5.0 / 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_step_leaves_state_untouched() {
        let (mut circuit, cap, probe) = rc(5.0, 1000.0, 1e-3);
        let lamp = circuit.add_lamp(100.0);
        link(&mut circuit, (lamp, 0), (cap, 0));
        to_ground(&mut circuit, lamp, 1);
        for _ in 0..10 {
            assert!(simulate_step(&mut circuit, 0.05).is_solved());
        }
        let charged = circuit.clone();
        assert!(reading(&circuit, cap) > 0.0);
        assert!(reading(&circuit, lamp) > 0.0);

        // A freshly dropped probe floats until it is wired in
        let stray = circuit.add_probe(ProbeChannel::B);
        let result = simulate_step(&mut circuit, 0.05);

        assert_eq!(result.status, SolveStatus::Singular);
        assert!(!result.node_voltages.is_empty());
        assert!(result.node_voltages.values().all(|v| *v == 0.0));
        assert!(result.source_currents.values().all(|i| *i == 0.0));
        for id in [cap, probe, lamp] {
            assert_eq!(
                reading(&circuit, id).to_bits(),
                reading(&charged, id).to_bits()
            );
        }

        // Wiring the probe in makes the circuit solvable again
        link(&mut circuit, (stray, 0), (cap, 0));
        to_ground(&mut circuit, stray, 1);
        assert!(simulate_step(&mut circuit, 0.05).is_solved());
        assert_abs_diff_eq!(
            reading(&circuit, stray),
            reading(&circuit, cap),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_floating_resistor_pair_is_singular() {
        let mut circuit = Circuit::new();
        let r = circuit.add_resistor(100.0);
        let c = circuit.add_capacitor(1e-3);
        link(&mut circuit, (r, 0), (c, 0));
        link(&mut circuit, (r, 1), (c, 1));
        let result = simulate_step(&mut circuit, 0.02);
        assert_eq!(result.status, SolveStatus::Singular);
        assert_eq!(result.node_voltages.len(), 2);
    }

    #[test]
    fn test_conflicting_sources_are_singular() {
        let mut circuit = Circuit::new();
        let v1 = circuit.add_voltage_source(5.0);
        let v2 = circuit.add_voltage_source(3.0);
        link(&mut circuit, (v1, 0), (v2, 0));
        to_ground(&mut circuit, v1, 1);
        to_ground(&mut circuit, v2, 1);

        let result = simulate_step(&mut circuit, 0.02);
        assert_eq!(result.status, SolveStatus::Singular);
        assert_eq!(result.current(v1), Some(0.0));
        assert_eq!(result.current(v2), Some(0.0));
    }

    #[test]
    fn test_zero_resistance_short_still_solves() {
        let (mut circuit, _, probe) = divider(10.0, 0.0, 1000.0);
        let result = simulate_step(&mut circuit, 0.02);
        assert!(result.is_solved());
        assert_abs_diff_eq!(reading(&circuit, probe), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_negative_resistance_follows_ohms_law() {
        // 10 V over -500 + 1000 ohm drives 20 mA, so 20 V across R2
        let (mut circuit, _, probe) = divider(10.0, -500.0, 1000.0);
        let result = simulate_step(&mut circuit, 0.02);
        assert!(result.is_solved());
        assert_relative_eq!(reading(&circuit, probe), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wire_shorts_by_identity() {
        let mut circuit = Circuit::new();
        let vs = circuit.add_voltage_source(6.0);
        let w = circuit.add_wire();
        let r = circuit.add_resistor(300.0);
        let probe = circuit.add_probe(ProbeChannel::A);
        link(&mut circuit, (vs, 0), (w, 0));
        link(&mut circuit, (w, 1), (r, 0));
        to_ground(&mut circuit, r, 1);
        to_ground(&mut circuit, vs, 1);
        link(&mut circuit, (probe, 0), (r, 0));
        to_ground(&mut circuit, probe, 1);

        let result = simulate_step(&mut circuit, 0.02);
        assert!(result.is_solved());
        assert_eq!(result.node_voltages.len(), 1);
        assert_relative_eq!(reading(&circuit, probe), 6.0);
        assert_relative_eq!(result.current(vs).unwrap(), -0.02);
    }

    #[test]
    fn test_empty_circuit_solves_trivially() {
        let mut circuit = Circuit::new();
        circuit.add_ground();
        let result = simulate_step(&mut circuit, 0.02);
        assert!(result.is_solved());
        assert!(result.node_voltages.is_empty());
    }

    #[test]
    fn test_identical_snapshots_give_identical_results() {
        let (mut a, _, _) = rc(5.0, 2200.0, 4.7e-4);
        for _ in 0..7 {
            simulate_step(&mut a, 0.01);
        }
        let mut b = a.clone();

        let ra = simulate_step(&mut a, 0.01);
        let rb = simulate_step(&mut b, 0.01);
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_simulator_tracks_time() {
        let (circuit, cap, _) = rc(5.0, 1000.0, 1e-3);
        let mut sim = Simulator::with_config(circuit, SimulatorConfig::new().with_dt(0.5)).unwrap();
        assert!(sim.last_result().is_none());

        let last = sim.run(4).unwrap().clone();
        assert!(last.is_solved());
        assert_eq!(sim.step_count(), 4);
        assert_relative_eq!(sim.time(), 2.0);

        let port = sim.circuit().port(cap, 0).unwrap();
        assert_relative_eq!(sim.port_voltage(port).unwrap(), reading(sim.circuit(), cap));
    }

    #[test]
    fn test_port_voltage_survives_later_merge() {
        let (circuit, _, probe) = divider(10.0, 1000.0, 4000.0);
        let mut sim = Simulator::new(circuit);
        sim.step();
        let tap = sim.circuit().port(probe, 0).unwrap();
        assert_relative_eq!(sim.port_voltage(tap).unwrap(), 8.0, epsilon = 1e-9);

        // Rewiring after the step moves the tap to a new root node
        sim.circuit_mut().ground(tap).unwrap();
        assert_relative_eq!(sim.port_voltage(tap).unwrap(), 8.0, epsilon = 1e-9);

        sim.step();
        assert_relative_eq!(sim.port_voltage(tap).unwrap(), 0.0);
    }

    #[test]
    fn test_simulator_rejects_bad_dt() {
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = Simulator::with_config(Circuit::new(), SimulatorConfig::new().with_dt(dt)).unwrap_err();
            assert!(matches!(err, OhmlabError::InvalidTimeStep { .. }));
        }
        let err = Simulator::with_config(
            Circuit::new(),
            SimulatorConfig::new().with_pivot_tolerance(0.0),
        )
        .unwrap_err();
        assert!(matches!(err, OhmlabError::InvalidSimulationParam { .. }));
    }
}
