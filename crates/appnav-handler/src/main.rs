//! `appnav` command line
//!
//! Offline access to the protocol pieces: hash key rewriting, inbound
//! conflict resolution, variant normalization and redaction.

use anyhow::{bail, Context, Result};
use appnav_handler::{NavigationConfig, StaticMetadata};
use appnav_selection::SelectionVariant;
use appnav_state::{
    extract_key, redact, replace_key, split_inbound_json, AppData, ParamHandlingMode,
    RedactionMode,
};
use clap::{Arg, ArgMatches, Command};
use serde_json::{json, Value};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("appnav")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cross-application navigation state tools")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Navigation config (TOML)"),
        )
        .subcommand(
            Command::new("extract-key")
                .about("Print the app-state key embedded in a hash")
                .arg(Arg::new("hash").required(true)),
        )
        .subcommand(
            Command::new("replace-key")
                .about("Write an app-state key into a hash")
                .arg(Arg::new("hash").required(true))
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("split")
                .about("Resolve a stored variant against startup parameters")
                .arg(
                    Arg::new("variant")
                        .long("variant")
                        .required(true)
                        .help("Selection variant JSON file"),
                )
                .arg(
                    Arg::new("params")
                        .long("params")
                        .required(true)
                        .help("Startup parameters JSON file"),
                )
                .arg(
                    Arg::new("defaulted")
                        .long("defaulted")
                        .value_delimiter(',')
                        .help("Comma separated defaulted parameter names"),
                )
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .help("SelVarWins, URLParamWins or InsertInSelOpt"),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print a selection variant in canonical JSON")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("redact")
                .about("Redact an app data payload against metadata")
                .arg(Arg::new("payload").long("payload").required(true))
                .arg(Arg::new("metadata").long("metadata").required(true))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("sensitive")
                        .help("sensitive or measure"),
                ),
        )
}

fn read_json(path: &str) -> Result<Value> {
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("cannot read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("{path} is not valid JSON"))
}

fn run(matches: &ArgMatches) -> Result<String> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => NavigationConfig::from_file(path)?,
        None => NavigationConfig::default(),
    };

    match matches.subcommand() {
        Some(("extract-key", args)) => {
            let hash = args.get_one::<String>("hash").map_or("", String::as_str);
            match extract_key(hash) {
                Some(key) => Ok(key.to_string()),
                None => bail!("no app-state key in '{hash}'"),
            }
        }
        Some(("replace-key", args)) => {
            let hash = args.get_one::<String>("hash").map(String::as_str);
            let key = args.get_one::<String>("key").map_or("", String::as_str);
            Ok(replace_key(hash, key)?)
        }
        Some(("split", args)) => {
            let variant_path = args.get_one::<String>("variant").context("--variant")?;
            let params_path = args.get_one::<String>("params").context("--params")?;
            let variant = SelectionVariant::from_json_value(&read_json(variant_path)?)?;
            let params = read_json(params_path)?;
            let defaulted: Vec<&String> = args
                .get_many::<String>("defaulted")
                .map(Iterator::collect)
                .unwrap_or_default();
            let policy = match args.get_one::<String>("policy") {
                Some(name) => name.parse::<ParamHandlingMode>()?,
                None => config.param_handling,
            };
            let result = split_inbound_json(
                &variant,
                &params,
                &json!(defaulted),
                policy,
                &config.parameter_filter(),
            )?;
            let output = json!({
                "navigationSelection": result.navigation_selection.to_json_value(),
                "defaultedSelection": result.defaulted_selection.to_json_value(),
                "navigationIsDefaultsOnly": result.navigation_is_defaults_only,
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
        Some(("normalize", args)) => {
            let path = args.get_one::<String>("file").context("file")?;
            let variant = SelectionVariant::from_json_value(&read_json(path)?)?;
            Ok(variant.to_json_string())
        }
        Some(("redact", args)) => {
            let payload_path = args.get_one::<String>("payload").context("--payload")?;
            let metadata_path = args.get_one::<String>("metadata").context("--metadata")?;
            let mode: RedactionMode = args
                .get_one::<String>("mode")
                .map_or("sensitive", String::as_str)
                .parse()?;
            let payload = AppData::from_json_value(&read_json(payload_path)?)
                .context("payload is not app data")?;
            let document = read_json(metadata_path)?;
            let Some(document) = document.as_object() else {
                bail!("metadata must be a JSON object keyed by path");
            };
            let metadata = StaticMetadata::from_document(document);
            let redacted = redact(&payload, &metadata, mode);
            Ok(serde_json::to_string_pretty(&redacted.to_json_value())?)
        }
        _ => bail!("unknown command"),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("APPNAV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let output = run(&matches)?;
    println!("{output}");
    Ok(())
}
