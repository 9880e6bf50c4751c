//! Built-in puzzle levels.
//!
//! Each level builds a starting circuit and carries goals that read probe or
//! lamp state after simulation. Some levels are solved as built; others need
//! component values changed before their goals pass.

mod catalog;

use std::fmt;

use crate::circuit::Circuit;
use crate::components::{ComponentKind, ProbeChannel};
use crate::error::{OhmlabError, Result};

pub use catalog::LEVELS;

/// Outcome of checking a goal against a circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalCheck {
    pub ok: bool,
    /// The measured quantity, `None` when the circuit lacks the element
    pub value: Option<f64>,
}

impl GoalCheck {
    fn new(ok: bool, value: Option<f64>) -> Self {
        Self { ok, value }
    }

    /// `value` within `tolerance` of `target`.
    pub fn near(value: Option<f64>, target: f64, tolerance: f64) -> Self {
        Self::new(value.is_some_and(|v| (v - target).abs() < tolerance), value)
    }

    /// `value` satisfies `pred`.
    pub fn when(value: Option<f64>, pred: impl Fn(f64) -> bool) -> Self {
        Self::new(value.is_some_and(pred), value)
    }
}

/// A single level objective.
#[derive(Clone)]
pub struct Goal {
    pub id: &'static str,
    pub description: &'static str,
    /// Human-readable target, e.g. `"2.0 V ±0.15"`
    pub target: &'static str,
    pub check: fn(&Circuit) -> GoalCheck,
}

/// A puzzle level.
#[derive(Clone)]
pub struct Level {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub build: fn() -> Result<Circuit>,
    pub goals: &'static [Goal],
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("id", &self.id)
            .field("goals", &self.goals)
            .finish_non_exhaustive()
    }
}

impl Level {
    /// Build a fresh copy of the starting circuit.
    pub fn circuit(&self) -> Result<Circuit> {
        (self.build)()
    }

    /// Check every goal against `circuit`.
    pub fn evaluate(&self, circuit: &Circuit) -> Vec<(&Goal, GoalCheck)> {
        self.goals
            .iter()
            .map(|goal| (goal, (goal.check)(circuit)))
            .collect()
    }

    /// Whether every goal passes.
    pub fn is_complete(&self, circuit: &Circuit) -> bool {
        self.goals.iter().all(|goal| (goal.check)(circuit).ok)
    }
}

/// All built-in levels, in catalog order.
pub fn levels() -> &'static [Level] {
    &LEVELS
}

/// Look up a level by id.
pub fn level(id: &str) -> Result<&'static Level> {
    LEVELS
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(|| OhmlabError::UnknownLevel { id: id.to_string() })
}

/// Reading of the first probe on `channel`.
pub fn probe_reading(circuit: &Circuit, channel: ProbeChannel) -> Option<f64> {
    circuit.probe(channel).map(|p| p.reading)
}

/// Power dissipated by the first lamp.
pub fn lamp_power(circuit: &Circuit) -> Option<f64> {
    circuit
        .first_of(ComponentKind::Lamp)
        .and_then(|c| c.reading())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::validate_circuit;
    use crate::solver::Simulator;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn run(id: &str, steps: usize) -> Circuit {
        let circuit = level(id).unwrap().circuit().unwrap();
        let mut sim = Simulator::new(circuit);
        let last = sim.run(steps).unwrap();
        assert!(last.is_solved(), "level {} did not solve", id);
        sim.into_circuit()
    }

    #[test]
    fn test_catalog() {
        assert_eq!(levels().len(), 12);
        let ids: HashSet<_> = levels().iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), 12);
        for l in levels() {
            assert!(!l.goals.is_empty(), "{} has no goals", l.id);
            let circuit = l.circuit().unwrap();
            validate_circuit(&circuit).unwrap();
        }
    }

    #[test]
    fn test_unknown_level() {
        assert!(matches!(
            level("nope").unwrap_err(),
            OhmlabError::UnknownLevel { .. }
        ));
    }

    #[test]
    fn test_divider_puzzle_starts_unsolved() {
        let c = run("ohms-01", 1);
        assert_relative_eq!(probe_reading(&c, ProbeChannel::A).unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(probe_reading(&c, ProbeChannel::B).unwrap(), 10.0, epsilon = 1e-9);
        assert!(!level("ohms-01").unwrap().is_complete(&c));
    }

    #[test]
    fn test_divider_puzzle_solvable() {
        let l = level("ohms-01").unwrap();
        let mut circuit = l.circuit().unwrap();
        // 2 V at the tap needs R1:R2 = 4:1
        let r1 = circuit.find("R1").unwrap().id();
        circuit.set_value(r1, 16_000.0).unwrap();
        let mut sim = Simulator::new(circuit);
        sim.step();
        let checks = l.evaluate(sim.circuit());
        assert!(checks[0].1.ok);
        assert!(!checks[1].1.ok, "probe B sits on the 10 V rail");
    }

    #[test]
    fn test_solved_levels() {
        for id in [
            "caps-series-01",
            "current-div-01",
            "ohms-law-01",
            "series-resistors",
            "parallel-resistors",
            "kvl-verification",
            "complex-divider",
        ] {
            let c = run(id, 5);
            assert!(level(id).unwrap().is_complete(&c), "{} should pass", id);
        }
    }

    #[test]
    fn test_current_divider_value() {
        let c = run("current-div-01", 1);
        assert_relative_eq!(
            probe_reading(&c, ProbeChannel::A).unwrap(),
            20.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rc_charge_needs_time() {
        let early = run("cap-01", 100);
        assert!(!level("cap-01").unwrap().is_complete(&early));
        let late = run("cap-01", 600);
        assert!(level("cap-01").unwrap().is_complete(&late));
    }

    #[test]
    fn test_rc_discharge() {
        let early = run("rc-discharge", 1);
        let v = probe_reading(&early, ProbeChannel::A).unwrap();
        assert!(v > 9.9 && v < 10.0);
        let late = run("rc-discharge", 400);
        assert!(level("rc-discharge").unwrap().is_complete(&late));
    }

    #[test]
    fn test_lamp_levels_start_dim() {
        let led = run("led-01", 1);
        let p = lamp_power(&led).unwrap();
        assert_relative_eq!(p, 20.0 * (9.0f64 / 350.0).powi(2), epsilon = 1e-9);
        assert!(!level("led-01").unwrap().is_complete(&led));

        let power = run("power-calc", 1);
        assert_relative_eq!(lamp_power(&power).unwrap(), 0.16, epsilon = 1e-9);
    }

    #[test]
    fn test_goal_check_missing_value() {
        assert!(!GoalCheck::near(None, 1.0, 0.5).ok);
        assert!(GoalCheck::near(Some(1.2), 1.0, 0.5).ok);
        assert!(!GoalCheck::when(Some(-1.0), |v| v > 0.0).ok);
    }
}
