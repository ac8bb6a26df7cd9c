//! `cobalt` operator CLI

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cobalt_core::{Backend, CobaltConfig, Collection, OwnerId};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn collection_arg() -> Arg {
    Arg::new("collection")
        .required(true)
        .value_parser(["ratings", "portfolio", "scenarios"])
        .help("Collection to operate on")
}

fn owner_arg() -> Arg {
    Arg::new("owner")
        .long("owner")
        .required(true)
        .help("Owner id the operation runs as")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Record id")
}

fn body_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .required(true)
        .help("JSON object body, or @path to read it from a file")
}

fn cli() -> Command {
    Command::new("cobalt")
        .version(cobalt_core::VERSION)
        .about("Inspect and edit a Cobalt data directory")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the data directory"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("list")
                .about("List an owner's records")
                .arg(collection_arg())
                .arg(owner_arg()),
        )
        .subcommand(
            Command::new("get")
                .about("Show one record")
                .arg(collection_arg())
                .arg(id_arg())
                .arg(owner_arg()),
        )
        .subcommand(
            Command::new("insert")
                .about("Add a record")
                .arg(collection_arg())
                .arg(owner_arg())
                .arg(body_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Merge fields into a record")
                .arg(collection_arg())
                .arg(id_arg())
                .arg(owner_arg())
                .arg(body_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove a record")
                .arg(collection_arg())
                .arg(id_arg())
                .arg(owner_arg()),
        )
        .subcommand(
            Command::new("seed")
                .about("Seed an owner's collections from the template owner")
                .arg(owner_arg()),
        )
        .subcommand(
            Command::new("submit")
                .about("Submit a scenario surface request")
                .arg(owner_arg())
                .arg(body_arg()),
        )
        .subcommand(
            Command::new("poll")
                .about("Fetch a scenario surface, completing it if pending")
                .arg(Arg::new("fingerprint").required(true)),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<CobaltConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = CobaltConfig::load(path.map(PathBuf::as_path))?;
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    debug!(data_dir = %config.data_dir.display(), "loaded configuration");
    Ok(config)
}

fn collection(args: &ArgMatches) -> Result<Collection> {
    let name = args
        .get_one::<String>("collection")
        .context("collection is required")?;
    Ok(name.parse()?)
}

fn owner(args: &ArgMatches) -> Result<OwnerId> {
    let owner = args.get_one::<String>("owner").context("--owner is required")?;
    Ok(OwnerId::new(owner.as_str()))
}

fn id(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("id")
        .map(String::as_str)
        .context("record id is required")
}

fn body(args: &ArgMatches) -> Result<Value> {
    let raw = args.get_one::<String>("json").context("--json is required")?;
    let text = match raw.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading body from {path}"))?
        }
        None => raw.clone(),
    };
    serde_json::from_str(&text).context("body is not valid JSON")
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let backend = Backend::open(load_config(matches)?);

    match matches.subcommand() {
        Some(("list", args)) => print(&backend.list(collection(args)?, &owner(args)?)?),
        Some(("get", args)) => print(&backend.get(collection(args)?, &owner(args)?, id(args)?)?),
        Some(("insert", args)) => {
            print(&backend.insert(collection(args)?, &owner(args)?, body(args)?)?)
        }
        Some(("update", args)) => print(&backend.update(
            collection(args)?,
            &owner(args)?,
            id(args)?,
            body(args)?,
        )?),
        Some(("delete", args)) => {
            let id = id(args)?;
            backend.delete(collection(args)?, &owner(args)?, id)?;
            print(&serde_json::json!({ "deleted": id }))
        }
        Some(("seed", args)) => print(&backend.on_signup(&owner(args)?)?),
        Some(("submit", args)) => print(&backend.submit_surface(&owner(args)?, body(args)?)?),
        Some(("poll", args)) => {
            let fingerprint = args
                .get_one::<String>("fingerprint")
                .context("fingerprint is required")?;
            print(&backend.poll_surface(fingerprint)?)
        }
        _ => Ok(()),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    if let Err(e) = run(&matches) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
