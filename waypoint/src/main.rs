//! Development harness around the mission engine.
//!
//! Loads the mission snapshot (`.waypoint/mission.json`), runs the pure
//! core against it, and prints the results. The core itself exposes no CLI
//! surface; this binary exists so snapshots can be inspected and validated
//! from the shell.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use waypoint::core::index::{MissionIndex, ScopeRef};
use waypoint::core::scope::available_inputs;
use waypoint::core::status::derive_step_status;
use waypoint::io::config::{load_config, write_config, EngineConfig};
use waypoint::io::mission_store::{load_mission, write_mission};
use waypoint::model::mission::{default_mission, Mission};
use waypoint::report::render_report;

const V1_SCHEMA: &str = include_str!("../schemas/mission/v1.schema.json");

const MISSION_PATH: &str = ".waypoint/mission.json";
const CONFIG_PATH: &str = ".waypoint/config.toml";
const SCHEMA_PATH: &str = "schemas/mission/v1.schema.json";

#[derive(Parser)]
#[command(
    name = "waypoint",
    version,
    about = "Variable-resolution and execution-state engine for mission trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.waypoint/mission.json`, config, and schema files if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check the snapshot against schema and invariants (unique ids,
    /// composite sizes, mapping references, etc.).
    Validate,
    /// Print derived statuses, for one step or for every step.
    Status {
        /// Step id to derive; omit to list all steps.
        node: Option<String>,
    },
    /// Print the variables legally available as inputs to a node.
    Inputs { node: String },
    /// Render the mission status report.
    Report,
}

fn main() {
    waypoint::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Validate => cmd_validate().map(|_| ()),
        Command::Status { node } => cmd_status(node.as_deref()),
        Command::Inputs { node } => cmd_inputs(&node),
        Command::Report => cmd_report(),
    }
}

fn cmd_init(force: bool) -> Result<()> {
    let mission_path = Path::new(MISSION_PATH);
    let config_path = Path::new(CONFIG_PATH);
    let schema_path = Path::new(SCHEMA_PATH);

    fs::create_dir_all(".waypoint").context("create .waypoint directory")?;
    fs::create_dir_all("schemas/mission").context("create schema directory")?;

    if force || !schema_path.exists() {
        fs::write(schema_path, V1_SCHEMA).context("write v1 schema")?;
    }
    if force || !mission_path.exists() {
        write_mission(mission_path, &default_mission()).context("write mission snapshot")?;
    }
    if force || !config_path.exists() {
        write_config(config_path, &EngineConfig::default()).context("write config")?;
    }

    Ok(())
}

fn cmd_validate() -> Result<Mission> {
    let config = load_config(Path::new(CONFIG_PATH)).context("load config.toml")?;
    let limits = config.limits()?;
    load_mission(Path::new(SCHEMA_PATH), Path::new(MISSION_PATH), &limits)
        .context("load mission.json")
}

fn cmd_status(node: Option<&str>) -> Result<()> {
    let mission = cmd_validate()?;
    let index = MissionIndex::build(&mission).map_err(|err| anyhow!(err))?;
    match node {
        Some(node_id) => {
            let Some(ScopeRef::Step(step)) = index.get(node_id) else {
                return Err(anyhow!("no step with id '{}'", node_id));
            };
            println!("{}", derive_step_status(step, &index).as_str());
        }
        None => {
            for stage in &mission.workflow.stages {
                for step in &stage.steps {
                    print_step_statuses(step, &index, 0);
                }
            }
        }
    }
    Ok(())
}

fn print_step_statuses(step: &waypoint::model::step::Step, index: &MissionIndex, depth: usize) {
    println!(
        "{}{}\t{}",
        "  ".repeat(depth),
        step.id,
        derive_step_status(step, index).as_str()
    );
    for child in step.substeps() {
        print_step_statuses(child, index, depth + 1);
    }
}

fn cmd_inputs(node: &str) -> Result<()> {
    let mission = cmd_validate()?;
    let variables = available_inputs(&mission, node).map_err(|err| anyhow!(err))?;
    for variable in variables {
        println!("{}\t{}", variable.id, variable.name);
    }
    Ok(())
}

fn cmd_report() -> Result<()> {
    let mission = cmd_validate()?;
    print!("{}", render_report(&mission)?);
    Ok(())
}
