//! WASM bindings for Ohmlab Core.
//!
//! Thin JavaScript-friendly wrapper around [`Simulator`] for the interactive
//! front end. Ids cross the boundary as plain `u32`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitSim } from 'ohmlab_core';
//!
//! await init();
//!
//! const sim = new WasmCircuitSim();
//! const vs = sim.add("vsource");
//! const r = sim.add("resistor");
//! const [vp, vn] = sim.ports(vs);
//! const [rp, rn] = sim.ports(r);
//! sim.connect(vp, rp);
//! sim.ground(vn);
//! sim.ground(rn);
//!
//! // once per animation frame
//! sim.step();
//! console.log(sim.port_voltage(rp));
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{Circuit, ComponentId, PortId};
use crate::components::ComponentKind;
use crate::error::OhmlabError;
use crate::levels;
use crate::netlist;
use crate::solver::{Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_err(e: OhmlabError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible circuit simulator.
#[wasm_bindgen]
pub struct WasmCircuitSim {
    simulator: Simulator,
}

#[wasm_bindgen]
impl WasmCircuitSim {
    /// Create a simulator with an empty circuit and the default step length.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCircuitSim {
        WasmCircuitSim {
            simulator: Simulator::new(Circuit::new()),
        }
    }

    /// Create a simulator from netlist text. A `.dt` directive sets the step.
    #[wasm_bindgen]
    pub fn from_netlist(text: &str) -> Result<WasmCircuitSim, JsValue> {
        let netlist = netlist::load(text).map_err(js_err)?;
        let mut config = SimulatorConfig::new();
        if let Some(dt) = netlist.dt {
            config = config.with_dt(dt);
        }
        let simulator = Simulator::with_config(netlist.circuit, config).map_err(js_err)?;
        Ok(WasmCircuitSim { simulator })
    }

    /// Create a simulator holding a level's starting circuit.
    #[wasm_bindgen]
    pub fn from_level(id: &str) -> Result<WasmCircuitSim, JsValue> {
        let circuit = levels::level(id).and_then(|l| l.circuit()).map_err(js_err)?;
        Ok(WasmCircuitSim {
            simulator: Simulator::new(circuit),
        })
    }

    /// Add a component by kind name (`"resistor"`, `"probeA"`, ...) with its
    /// default value. Returns the component id.
    #[wasm_bindgen]
    pub fn add(&mut self, kind: &str) -> Result<u32, JsValue> {
        let kind: ComponentKind = kind.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let id = self.simulator.circuit_mut().add(kind, None);
        Ok(id.0 as u32)
    }

    /// Remove a component. Returns false if it did not exist.
    #[wasm_bindgen]
    pub fn remove(&mut self, id: u32) -> bool {
        self.simulator
            .circuit_mut()
            .remove(ComponentId(id as usize))
            .is_some()
    }

    /// Port ids of a component, in port order.
    #[wasm_bindgen]
    pub fn ports(&self, id: u32) -> Result<Vec<u32>, JsValue> {
        let ports = self
            .simulator
            .circuit()
            .ports(ComponentId(id as usize))
            .map_err(js_err)?;
        Ok(ports.iter().map(|p| p.0 as u32).collect())
    }

    /// Join two ports. Returns the surviving node id (0 is ground).
    #[wasm_bindgen]
    pub fn connect(&mut self, a: u32, b: u32) -> Result<u32, JsValue> {
        let node = self
            .simulator
            .circuit_mut()
            .connect(PortId(a as usize), PortId(b as usize))
            .map_err(js_err)?;
        Ok(node.0 as u32)
    }

    /// Tie a port to ground.
    #[wasm_bindgen]
    pub fn ground(&mut self, port: u32) -> Result<(), JsValue> {
        self.simulator
            .circuit_mut()
            .ground(PortId(port as usize))
            .map_err(js_err)?;
        Ok(())
    }

    /// Set a component's primary value. Returns false for kinds without one.
    #[wasm_bindgen]
    pub fn set_value(&mut self, id: u32, value: f64) -> Result<bool, JsValue> {
        self.simulator
            .circuit_mut()
            .set_value(ComponentId(id as usize), value)
            .map_err(js_err)
    }

    /// Primary value of a component.
    #[wasm_bindgen]
    pub fn value(&self, id: u32) -> Option<f64> {
        self.simulator
            .circuit()
            .component(ComponentId(id as usize))
            .and_then(|c| c.value())
    }

    /// Advance one step. Returns false if the system was singular.
    #[wasm_bindgen]
    pub fn step(&mut self) -> bool {
        self.simulator.step().is_solved()
    }

    /// Advance `steps` steps. Returns whether the last one solved.
    #[wasm_bindgen]
    pub fn run(&mut self, steps: u32) -> bool {
        self.simulator
            .run(steps as usize)
            .is_some_and(|r| r.is_solved())
    }

    /// Probe reading, lamp power or capacitor voltage.
    #[wasm_bindgen]
    pub fn reading(&self, id: u32) -> Option<f64> {
        self.simulator
            .circuit()
            .component(ComponentId(id as usize))
            .and_then(|c| c.reading())
    }

    /// Voltage at a port on the last step.
    #[wasm_bindgen]
    pub fn port_voltage(&self, port: u32) -> Result<f64, JsValue> {
        self.simulator
            .port_voltage(PortId(port as usize))
            .map_err(js_err)
    }

    /// Whether every goal of the level passes on the current circuit.
    #[wasm_bindgen]
    pub fn level_complete(&self, level_id: &str) -> Result<bool, JsValue> {
        let level = levels::level(level_id).map_err(js_err)?;
        Ok(level.is_complete(self.simulator.circuit()))
    }

    /// Simulated time in seconds.
    #[wasm_bindgen(getter)]
    pub fn time(&self) -> f64 {
        self.simulator.time()
    }

    /// Step length in seconds.
    #[wasm_bindgen(getter)]
    pub fn dt(&self) -> f64 {
        self.simulator.dt()
    }
}

impl Default for WasmCircuitSim {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Ids of the built-in levels, in catalog order.
#[wasm_bindgen]
pub fn level_ids() -> Vec<String> {
    levels::levels().iter().map(|l| l.id.to_string()).collect()
}
