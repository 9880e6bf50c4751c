//! Level definitions.

use super::{lamp_power, probe_reading, Goal, GoalCheck, Level};
use crate::circuit::{Circuit, ComponentId};
use crate::components::{Component, ProbeChannel};
use crate::error::Result;

// Port indices on two-terminal parts: p / + first, n / - second.
const P: usize = 0;
const N: usize = 1;

fn join(c: &mut Circuit, a: (ComponentId, usize), b: (ComponentId, usize)) -> Result<()> {
    let pa = c.port(a.0, a.1)?;
    let pb = c.port(b.0, b.1)?;
    c.connect(pa, pb)?;
    Ok(())
}

fn to_ground(c: &mut Circuit, a: (ComponentId, usize)) -> Result<()> {
    let port = c.port(a.0, a.1)?;
    c.ground(port)?;
    Ok(())
}

fn probe_a(c: &Circuit) -> Option<f64> {
    probe_reading(c, ProbeChannel::A)
}

fn probe_b(c: &Circuit) -> Option<f64> {
    probe_reading(c, ProbeChannel::B)
}

pub static LEVELS: [Level; 12] = [
    Level {
        id: "ohms-01",
        title: "Voltage Divider (target: probe A ≈ 2 V, probe B ≈ 8 V)",
        description: "Learn how voltage divides across resistors in series. \
                      Adjust resistor values to achieve the target voltages.",
        build: ohms_01,
        goals: &[
            Goal {
                id: "A2",
                description: "Blue probe (A) ≈ 2.0 V",
                target: "2.0 V ±0.15",
                check: |c| GoalCheck::near(probe_a(c), 2.0, 0.15),
            },
            Goal {
                id: "B8",
                description: "Green probe (B) ≈ 8.0 V",
                target: "8.0 V ±0.15",
                check: |c| GoalCheck::near(probe_b(c), 8.0, 0.15),
            },
        ],
    },
    Level {
        id: "cap-01",
        title: "RC Charge (watch A climb toward 5 V)",
        description: "Observe how a capacitor charges through a resistor over time.",
        build: cap_01,
        goals: &[Goal {
            id: "A_at_least_3V",
            description: "After a few seconds, A ≥ 3 V",
            target: "≥ 3 V",
            check: |c| GoalCheck::when(probe_a(c), |v| v >= 3.0),
        }],
    },
    Level {
        id: "caps-series-01",
        title: "Capacitors in Series (observe voltage split)",
        description: "Learn how capacitors in series split voltage inversely \
                      proportional to their capacitance.",
        build: caps_series_01,
        goals: &[Goal {
            id: "smaller_cap_higher_V",
            description: "At steady state, smaller C gets higher V (B > A)",
            target: "B − A > 0.5 V",
            check: |c| {
                let diff = probe_b(c).zip(probe_a(c)).map(|(b, a)| b - a);
                GoalCheck::when(diff, |d| d > 0.5)
            },
        }],
    },
    Level {
        id: "current-div-01",
        title: "Current Division with Parallel Resistors",
        description: "Learn how current divides in parallel resistors.",
        build: current_div_01,
        goals: &[Goal {
            id: "parallel_voltage",
            description: "Measure voltage across parallel resistors",
            target: "~6.67 V",
            check: |c| GoalCheck::near(probe_a(c), 6.67, 0.5),
        }],
    },
    Level {
        id: "led-01",
        title: "LED Circuit with Current Limiting",
        description: "Design a circuit to safely light an LED.",
        build: led_01,
        goals: &[Goal {
            id: "led_lit",
            description: "LED is lit (power > 0.1 W)",
            target: "> 0.1 W",
            check: |c| GoalCheck::when(lamp_power(c), |p| p > 0.1),
        }],
    },
    Level {
        id: "ohms-law-01",
        title: "Ohms Law Verification",
        description: "Verify Ohms law: V = I × R",
        build: ohms_law_01,
        goals: &[Goal {
            id: "verify_ohms",
            description: "Voltage across 2kΩ should be 12V",
            target: "12 V ±0.5",
            check: |c| GoalCheck::near(probe_a(c), 12.0, 0.5),
        }],
    },
    Level {
        id: "series-resistors",
        title: "Series Resistor Addition",
        description: "Learn how resistances add in series circuits.",
        build: series_resistors,
        goals: &[Goal {
            id: "series_voltage",
            description: "Measure voltage at junction between R1 and R2",
            target: "~11.67 V",
            check: |c| GoalCheck::near(probe_a(c), 11.67, 0.5),
        }],
    },
    Level {
        id: "rc-discharge",
        title: "RC Discharge Circuit",
        description: "Observe capacitor discharge through a resistor.",
        build: rc_discharge,
        goals: &[Goal {
            id: "discharge_target",
            description: "Voltage should decay below 5V",
            target: "< 5 V",
            check: |c| GoalCheck::when(probe_a(c), |v| v > 0.0 && v < 5.0),
        }],
    },
    Level {
        id: "parallel-resistors",
        title: "Parallel Resistance Calculation",
        description: "Calculate equivalent resistance of parallel resistors.",
        build: parallel_resistors,
        goals: &[Goal {
            id: "parallel_equiv",
            description: "Voltage should equal source voltage",
            target: "10 V ±0.2",
            check: |c| GoalCheck::near(probe_a(c), 10.0, 0.2),
        }],
    },
    Level {
        id: "kvl-verification",
        title: "Kirchhoffs Voltage Law",
        description: "Verify that voltages around a loop sum to zero.",
        build: kvl_verification,
        goals: &[Goal {
            id: "kvl_check",
            description: "Sum of voltage drops equals source voltage",
            target: "8 V ±0.5",
            // drop across R1 is B - A
            check: |c| {
                let v_r1 = probe_b(c).zip(probe_a(c)).map(|(b, a)| b - a);
                GoalCheck::near(v_r1, 8.0, 0.5)
            },
        }],
    },
    Level {
        id: "power-calc",
        title: "Power Calculation in Circuits",
        description: "Calculate power dissipation in circuit elements.",
        build: power_calc,
        goals: &[Goal {
            id: "lamp_power",
            description: "Lamp should dissipate significant power",
            target: "> 0.5 W",
            check: |c| GoalCheck::when(lamp_power(c), |p| p > 0.5),
        }],
    },
    Level {
        id: "complex-divider",
        title: "Complex Voltage Divider",
        description: "Master voltage division with multiple taps.",
        build: complex_divider,
        goals: &[
            Goal {
                id: "first_tap",
                description: "First tap (A) should be 18V",
                target: "18 V ±1",
                check: |c| GoalCheck::near(probe_a(c), 18.0, 1.0),
            },
            Goal {
                id: "second_tap",
                description: "Second tap (B) should be 6V",
                target: "6 V ±1",
                check: |c| GoalCheck::near(probe_b(c), 6.0, 1.0),
            },
        ],
    },
];

fn ohms_01() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(10.0);
    let r1 = c.add_resistor(1000.0);
    let r2 = c.add_resistor(4000.0);
    let a = c.add_probe(ProbeChannel::A);
    let b = c.add_probe(ProbeChannel::B);
    c.add_ground();

    join(&mut c, (vs, P), (r1, P))?;
    join(&mut c, (r1, N), (r2, P))?;
    to_ground(&mut c, (r2, N))?;
    to_ground(&mut c, (vs, N))?;

    join(&mut c, (a, P), (r1, N))?;
    to_ground(&mut c, (a, N))?;
    join(&mut c, (b, P), (vs, P))?;
    to_ground(&mut c, (b, N))?;
    Ok(c)
}

fn cap_01() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(5.0);
    let r = c.add_resistor(10_000.0);
    let cap = c.add_capacitor(1e-3);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    join(&mut c, (vs, P), (r, P))?;
    join(&mut c, (r, N), (cap, P))?;
    to_ground(&mut c, (cap, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (cap, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

fn caps_series_01() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(10.0);
    let c1 = c.add_capacitor(8e-3);
    let c2 = c.add_capacitor(40e-3);
    let a = c.add_probe(ProbeChannel::A);
    let b = c.add_probe(ProbeChannel::B);
    c.add_ground();

    join(&mut c, (vs, P), (c1, P))?;
    join(&mut c, (c1, N), (c2, P))?;
    to_ground(&mut c, (c2, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (c1, N))?;
    to_ground(&mut c, (a, N))?;
    join(&mut c, (b, P), (c1, P))?;
    to_ground(&mut c, (b, N))?;
    Ok(c)
}

fn current_div_01() -> Result<Circuit> {
    let mut c = Circuit::new();
    let is = c.add_current_source(0.01);
    let r1 = c.add_resistor(1000.0);
    let r2 = c.add_resistor(2000.0);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    // both resistors hang off the source's p terminal
    join(&mut c, (is, P), (r1, P))?;
    join(&mut c, (is, P), (r2, P))?;
    to_ground(&mut c, (r1, N))?;
    to_ground(&mut c, (r2, N))?;
    to_ground(&mut c, (is, N))?;
    join(&mut c, (a, P), (r1, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

/// Source, series resistor and lamp to ground, probe A across the lamp.
fn lamp_loop(volts: f64, ohms: f64, lamp_ohms: f64) -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(volts);
    let r = c.add_resistor(ohms);
    let lamp = c.add_lamp(lamp_ohms);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    join(&mut c, (vs, P), (r, P))?;
    join(&mut c, (r, N), (lamp, P))?;
    to_ground(&mut c, (lamp, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (lamp, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

fn led_01() -> Result<Circuit> {
    lamp_loop(9.0, 330.0, 20.0)
}

fn ohms_law_01() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(12.0);
    let r = c.add_resistor(2000.0);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    join(&mut c, (vs, P), (r, P))?;
    to_ground(&mut c, (r, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (r, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

fn series_resistors() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(15.0);
    let r1 = c.add_resistor(1000.0);
    let r2 = c.add_resistor(2000.0);
    let r3 = c.add_resistor(1500.0);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    join(&mut c, (vs, P), (r1, P))?;
    join(&mut c, (r1, N), (r2, P))?;
    join(&mut c, (r2, N), (r3, P))?;
    to_ground(&mut c, (r3, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (r2, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

fn rc_discharge() -> Result<Circuit> {
    let mut c = Circuit::new();
    let cap = c.add_capacitor(2e-3);
    let r = c.add_resistor(5000.0);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    if let Some(Component::Capacitor(cap)) = c.component_mut(cap) {
        cap.v_prev = 10.0;
    }
    join(&mut c, (cap, P), (r, P))?;
    to_ground(&mut c, (r, N))?;
    to_ground(&mut c, (cap, N))?;
    join(&mut c, (a, P), (cap, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

fn parallel_resistors() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(10.0);
    let r1 = c.add_resistor(1000.0);
    let r2 = c.add_resistor(1000.0);
    let a = c.add_probe(ProbeChannel::A);
    c.add_ground();

    join(&mut c, (vs, P), (r1, P))?;
    join(&mut c, (vs, P), (r2, P))?;
    to_ground(&mut c, (r1, N))?;
    to_ground(&mut c, (r2, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (r1, P))?;
    to_ground(&mut c, (a, N))?;
    Ok(c)
}

/// Source across three series resistors with probes A and B on two taps.
fn tapped_chain(volts: f64, ohms: [f64; 3], tap_a: usize, tap_b: usize) -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(volts);
    let rs = ohms.map(|r| c.add_resistor(r));
    let a = c.add_probe(ProbeChannel::A);
    let b = c.add_probe(ProbeChannel::B);
    c.add_ground();

    join(&mut c, (vs, P), (rs[0], P))?;
    join(&mut c, (rs[0], N), (rs[1], P))?;
    join(&mut c, (rs[1], N), (rs[2], P))?;
    to_ground(&mut c, (rs[2], N))?;
    to_ground(&mut c, (vs, N))?;

    // tap k sits below resistor k; tap 0 is the source rail
    let tap = |k: usize| if k == 0 { (rs[0], P) } else { (rs[k - 1], N) };
    join(&mut c, (a, P), tap(tap_a))?;
    to_ground(&mut c, (a, N))?;
    join(&mut c, (b, P), tap(tap_b))?;
    to_ground(&mut c, (b, N))?;
    Ok(c)
}

fn kvl_verification() -> Result<Circuit> {
    let mut c = Circuit::new();
    let vs = c.add_voltage_source(12.0);
    let r1 = c.add_resistor(2000.0);
    let r2 = c.add_resistor(1000.0);
    let a = c.add_probe(ProbeChannel::A);
    let b = c.add_probe(ProbeChannel::B);
    c.add_ground();

    join(&mut c, (vs, P), (r1, P))?;
    join(&mut c, (r1, N), (r2, P))?;
    to_ground(&mut c, (r2, N))?;
    to_ground(&mut c, (vs, N))?;
    join(&mut c, (a, P), (r1, N))?;
    to_ground(&mut c, (a, N))?;
    join(&mut c, (b, P), (r1, P))?;
    to_ground(&mut c, (b, N))?;
    Ok(c)
}

fn power_calc() -> Result<Circuit> {
    lamp_loop(20.0, 400.0, 100.0)
}

fn complex_divider() -> Result<Circuit> {
    tapped_chain(24.0, [1000.0, 2000.0, 1000.0], 1, 2)
}
