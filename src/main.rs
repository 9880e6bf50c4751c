//! Ohmlab - circuit puzzle simulator
//!
//! Headless front end for the simulation engine.
//!
//! # Usage
//!
//! ```bash
//! ohmlab run circuit.net --steps 500 --every 50
//! ohmlab level cap-01 --steps 600
//! ohmlab levels
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};
use ohmlab_core::{
    circuit::{floating_nodes, Circuit},
    error::Result,
    levels, netlist,
    solver::SimulatorConfig,
    Simulator,
};

/// Lumped circuit simulator for circuit puzzles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a netlist file and print component readings
    Run {
        /// Path to the netlist file
        #[arg(value_name = "NETLIST_FILE")]
        netlist_file: PathBuf,

        /// Step length in seconds (overrides `.dt`)
        #[arg(long)]
        dt: Option<f64>,

        /// Number of steps (overrides `.steps`)
        #[arg(short, long)]
        steps: Option<usize>,

        /// Print a row every N steps
        #[arg(short, long, default_value_t = 1)]
        every: usize,
    },

    /// Simulate a built-in level and report its goals
    Level {
        /// Level id, see `ohmlab levels`
        id: String,

        /// Step length in seconds
        #[arg(long, default_value_t = ohmlab_core::DEFAULT_DT)]
        dt: f64,

        /// Number of steps
        #[arg(short, long, default_value_t = 500)]
        steps: usize,
    },

    /// List the built-in levels
    Levels,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Run {
            netlist_file,
            dt,
            steps,
            every,
        } => {
            let ast = netlist::parse_file(&netlist_file)?;
            let netlist = netlist::Netlist::from_ast(&ast)?;
            let dt = dt.or(netlist.dt).unwrap_or(ohmlab_core::DEFAULT_DT);
            let steps = steps.or(netlist.steps).unwrap_or(1);
            run_netlist(netlist.circuit, dt, steps, every.max(1))
        }
        Command::Level { id, dt, steps } => run_level(&id, dt, steps),
        Command::Levels => {
            for level in levels::levels() {
                println!("{:<20} {}", level.id, level.title);
            }
            Ok(())
        }
    }
}

fn check_topology(circuit: &Circuit) {
    for node in floating_nodes(circuit) {
        warn!("node {} has no path to ground; steps will be singular", node);
    }
}

/// Components whose state is worth printing: probes, lamps and capacitors.
fn reading_columns(circuit: &Circuit) -> Vec<(String, ohmlab_core::circuit::ComponentId)> {
    circuit
        .components()
        .iter()
        .filter(|c| c.reading().is_some())
        .map(|c| (c.name().to_string(), c.id()))
        .collect()
}

fn run_netlist(circuit: Circuit, dt: f64, steps: usize, every: usize) -> Result<()> {
    check_topology(&circuit);
    let columns = reading_columns(&circuit);

    let config = SimulatorConfig::new().with_dt(dt);
    let mut sim = Simulator::with_config(circuit, config)?;
    info!("simulating {} steps of {} s", steps, dt);

    let header: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
    println!("time\t{}", header.join("\t"));

    let mut singular = 0usize;
    for n in 1..=steps {
        if !sim.step().is_solved() {
            singular += 1;
        }
        if n % every == 0 || n == steps {
            let row: Vec<String> = columns
                .iter()
                .map(|(_, id)| {
                    let value = sim.circuit().component(*id).and_then(|c| c.reading());
                    format!("{:.6}", value.unwrap_or(0.0))
                })
                .collect();
            println!("{:.4}\t{}", sim.time(), row.join("\t"));
        }
    }

    if singular > 0 {
        warn!("{} of {} steps were singular", singular, steps);
    }
    Ok(())
}

fn run_level(id: &str, dt: f64, steps: usize) -> Result<()> {
    let level = levels::level(id)?;
    let circuit = level.circuit()?;
    check_topology(&circuit);

    let config = SimulatorConfig::new().with_dt(dt);
    let mut sim = Simulator::with_config(circuit, config)?;
    sim.run(steps);

    println!("{}", level.title);
    println!("{}", level.description);
    println!("after {} steps ({:.2} s):", sim.step_count(), sim.time());
    for (goal, check) in level.evaluate(sim.circuit()) {
        let mark = if check.ok { "PASS" } else { "FAIL" };
        let value = check
            .value
            .map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v));
        println!(
            "  [{}] {} (measured {}, target {})",
            mark, goal.description, value, goal.target
        );
    }
    Ok(())
}
