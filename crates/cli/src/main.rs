use anyhow::{Context, Result};
use civforge_build::{build, run, BuildOptions, HookedScripts, Settings};
use civforge_modinfo::ModInfo;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  civforge build <mod.json> [--out <dir>] [--rebuild]
  civforge run <mod.json> [--out <dir>] [--rebuild] [--release]";

/// On-disk description of a mod: the `.modinfo` fields plus the Python
/// scripts to hook into the game's shell.
#[derive(Debug, Deserialize)]
struct ModDescription {
    #[serde(flatten)]
    modinfo: ModInfo,
    #[serde(default)]
    hooked_scripts: Vec<HookedScripts>,
}

#[derive(Debug)]
enum Command {
    Build {
        description: PathBuf,
        options: BuildOptions,
    },
    Run {
        description: PathBuf,
        options: BuildOptions,
        debug: bool,
    },
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let mut iter = args.iter();
    let verb = iter.next().ok_or("missing command")?;
    let description = PathBuf::from(iter.next().ok_or("missing mod description path")?);
    let mut options = BuildOptions::default();
    let mut release = false;
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--out" => {
                let dir = iter.next().ok_or("--out needs a directory")?;
                options.out_dir = Some(PathBuf::from(dir));
            }
            "--rebuild" => options.rebuild = true,
            "--release" if verb == "run" => release = true,
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    match verb.as_str() {
        "build" => Ok(Command::Build { description, options }),
        "run" => Ok(Command::Run {
            description,
            options,
            debug: !release,
        }),
        other => Err(format!("unknown command: {other}")),
    }
}

fn load_description(path: &PathBuf) -> Result<ModDescription> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read mod description {}", path.display()))?;
    let description = serde_json::from_str(&raw)
        .with_context(|| format!("parse mod description {}", path.display()))?;
    Ok(description)
}

fn execute(command: Command) -> Result<()> {
    let settings = Settings::from_env()?;
    let report = match command {
        Command::Build { description, options } => {
            let description = load_description(&description)?;
            build(
                &description.modinfo,
                &description.hooked_scripts,
                &settings,
                &options,
            )?
        }
        Command::Run {
            description,
            options,
            debug,
        } => {
            let description = load_description(&description)?;
            run(
                &description.modinfo,
                &description.hooked_scripts,
                &settings,
                &options,
                debug,
            )?
        }
    };
    for warning in &report.warnings {
        eprintln!("mod warning: {}", warning);
    }
    println!("built {}", report.mod_dir.display());
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_command(&args) {
        Ok(command) => {
            if let Err(error) = execute(command) {
                eprintln!("error: {error:#}");
                std::process::exit(1);
            }
        }
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}
