//! Headless placement driver: loads the building catalog and placement tuning,
//! replays a scripted input session against a simulated world, and prints
//! what got built.
#![forbid(unsafe_code)]

mod replay;
mod script;
mod sim;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;
use palisade_catalog::BuildingCatalog;
use palisade_place::{PlacementConfig, PlacementSession};

use crate::script::Script;
use crate::sim::SimWorld;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding buildings.toml, placement.toml and scripts/.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,
    /// Building catalog (defaults to <assets>/buildings.toml).
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Placement tuning (defaults to <assets>/placement.toml; built-in values if absent).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Input script to replay (defaults to <assets>/scripts/demo.toml).
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            use simplelog::{
                ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger,
            };
            CombinedLogger::init(vec![
                TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(level, Config::default(), File::create(path)?),
            ])?;
        }
        None => {
            let env = env_logger::Env::default().default_filter_or(level.as_str());
            env_logger::Builder::from_env(env).init();
        }
    }
    Ok(())
}

fn load_config(path: &Path, explicit: bool) -> Result<PlacementConfig, Box<dyn Error>> {
    if !explicit && !path.exists() {
        log::info!("no {} found, using built-in placement tuning", path.display());
        return Ok(PlacementConfig::default());
    }
    PlacementConfig::from_path(path)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.level(), args.log_file.as_deref())?;

    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| args.assets.join("buildings.toml"));
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.assets.join("placement.toml"));
    let script_path = args
        .script
        .clone()
        .unwrap_or_else(|| args.assets.join("scripts").join("demo.toml"));

    let catalog = BuildingCatalog::from_path(&catalog_path)
        .map_err(|e| format!("{}: {}", catalog_path.display(), e))?;
    log::info!(
        "catalog {}: {} template(s)",
        catalog_path.display(),
        catalog.len()
    );
    for (i, t) in catalog.iter().enumerate() {
        log::debug!("  [{}] {} '{}' {:?}", i, t.id, t.name, t.category);
    }
    let settings = load_config(&config_path, args.config.is_some())
        .map_err(|e| format!("{}: {}", config_path.display(), e))?
        .validate()?;
    let script = Script::from_path(&script_path)
        .map_err(|e| format!("{}: {}", script_path.display(), e))?;
    log::info!(
        "script {}: {} step(s), {} tick(s)",
        script_path.display(),
        script.steps.len(),
        script.duration()
    );

    let mut world = SimWorld::new(script.world.clone());
    let mut session = PlacementSession::new(catalog, settings);
    let summary = replay::run(&script, &mut session, &mut world);
    for (id, template, pose) in world.placed() {
        log::debug!(
            "body {} '{}' at ({:.2}, {:.2}, {:.2}) yaw {}",
            id,
            template,
            pose.pos.x,
            pose.pos.y,
            pose.pos.z,
            pose.yaw_deg
        );
    }
    log::debug!("{} preview body(ies) left in world", world.preview_count());
    println!("{}", summary);
    Ok(())
}
