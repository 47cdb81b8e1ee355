//! `tagsync` command-line front end

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tagsync_engine::{
    CancellationToken, FsWorkspace, PatternRegistry, Report, Status, SyncConfig, YamlDesignModel,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "tagsync.toml";

fn cli() -> Command {
    Command::new("tagsync")
        .version(tagsync_engine::VERSION)
        .about("Keep a Java source tree reconciled with a tagged design model")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: tagsync.toml under --root, if present)"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Project directory paths are resolved against"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .short('p')
                .global(true)
                .help("Pattern profile overriding the config"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(Command::new("generate").about("Synthesize missing tagged elements"))
        .subcommand(
            Command::new("validate").about("Report deviations; exits 1 when errors are found"),
        )
        .subcommand(
            Command::new("update-model")
                .about("Record untagged methods of tagged types in the design model"),
        )
        .subcommand(Command::new("patterns").about("List pattern profiles"))
}

fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches, root: &Path) -> anyhow::Result<SyncConfig> {
    let explicit = matches.get_one::<PathBuf>("config");
    let path = explicit
        .map(|p| root.join(p))
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG));

    let mut config = if explicit.is_some() || path.is_file() {
        SyncConfig::load(&path).with_context(|| format!("loading {}", path.display()))?
    } else {
        tracing::debug!("no config file, using defaults");
        SyncConfig::default()
    };
    if let Some(profile) = matches.get_one::<String>("profile") {
        config = config.with_profile(profile);
    }
    Ok(config)
}

fn load_model(config: &SyncConfig, root: &Path) -> anyhow::Result<YamlDesignModel> {
    match &config.design_model {
        Some(path) => {
            let path = root.join(path);
            YamlDesignModel::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(YamlDesignModel::default()),
    }
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for finding in &report.findings {
        match &finding.file {
            Some(file) => println!("{finding} ({})", file.display()),
            None => println!("{finding}"),
        }
    }
    for path in &report.skipped {
        println!("skipped: {}", path.display());
    }
    if report.cancelled {
        println!("cancelled");
    }
    println!("status: {} ({} findings)", report.status(), report.findings.len());
    Ok(())
}

/// Run a parsed command line, returning the process exit code
fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    let registry = PatternRegistry::with_defaults();

    if let Some(("patterns", _)) = matches.subcommand() {
        for pattern in registry.iter() {
            println!("{:<10} {}", pattern.name(), pattern.description());
        }
        return Ok(0);
    }

    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let json = matches.get_flag("json");
    let config = load_config(matches, &root)?;
    let model = load_model(&config, &root)?;
    let workspace = FsWorkspace::new(&root);
    let pattern = registry.resolve(&config.profile)?;
    let monitor = CancellationToken::new();

    tracing::info!(profile = %config.profile, root = %root.display(), "starting");

    match matches.subcommand() {
        Some(("generate", _)) => {
            let report = pattern.generate(&model, &workspace, &config, &monitor)?;
            print_report(&report, json)?;
            Ok(0)
        }
        Some(("validate", _)) => {
            let report = pattern.validate(&model, &workspace, &config, &monitor)?;
            print_report(&report, json)?;
            Ok(i32::from(report.status() == Status::Error))
        }
        Some(("update-model", _)) => {
            let report = pattern.update(&model, &workspace, &config, &monitor)?;
            print_report(&report, json)?;
            if model.is_dirty() {
                if model.path().is_none() {
                    bail!("elements were recorded but no design_model file is configured");
                }
                model.save()?;
            }
            Ok(0)
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let code = match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            2
        }
    };
    std::process::exit(code);
}
