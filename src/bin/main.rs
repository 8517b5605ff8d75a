//! Beesign CLI - inspect the durable sign-request queue
//!
//!   beesign pending                  → Persisted (chain-transport) requests as JSON
//!   beesign inspect <file>           → Shape, total fee and warnings of a transaction file
//!   beesign clear                    → Purge the persisted queue
//!
//! `inspect` reads a JSON array of transactions and groups them by their
//! `group` id before analysis. Pass `--signer <address>` (repeatable) for
//! every address the wallet can sign for; fees and warnings of other senders
//! are ignored, exactly as on the approval screen.
//!
//! Configuration:
//!   --app <name>, --data-dir <path>, BEESIGN_ROOT, RUST_LOG, BEESIGN_LOG_JSON

use anyhow::{anyhow, bail, Context, Result};
use beesign::analysis::{analyze_groups, group_transactions, SignableAddresses};
use beesign::core::address::is_valid_address;
use beesign::logging::init_logging_with;
use beesign::{DisplayableTransaction, StoreConfig};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::{debug, warn};

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = match ParsedArgs::parse(&args[1..]) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}", json!({"error": e.to_string()}));
            std::process::exit(2);
        }
    };
    init_logging_with(if opts.verbose { "debug" } else { "warn" });

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("beesign {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("pending") | Some("ls") => cmd_pending(&opts),
        Some("inspect") => cmd_inspect(&opts),
        Some("clear") => cmd_clear(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || std::io::stdout().is_terminal();
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{e:#}")}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    file: Option<String>,
    app: Option<String>,
    data_dir: Option<String>,
    signers: Vec<String>,
    pretty: bool,
    verbose: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| iter.next().cloned().ok_or_else(|| anyhow!("{flag} needs a value"));
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--pretty" => opts.pretty = true,
                "--verbose" | "-v" => opts.verbose = true,
                "--app" | "-a" => opts.app = Some(value(arg.as_str())?),
                "--data-dir" | "-d" => opts.data_dir = Some(value(arg.as_str())?),
                "--signer" | "-s" => opts.signers.push(value(arg.as_str())?),
                other if other.starts_with('-') => bail!("Unknown option: {other}"),
                other => positional.push(other.to_string()),
            }
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.file = positional.next();
        Ok(opts)
    }

    fn store_config(&self) -> StoreConfig {
        let config = StoreConfig::new(self.app.clone().unwrap_or_else(|| beesign::core::paths::DEFAULT_APP.into()));
        match &self.data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        }
    }
}

fn cmd_pending(opts: &ParsedArgs) -> Result<Value> {
    let config = opts.store_config();
    debug!(dir = %config.resolve_data_dir().display(), "reading persisted queue");
    let store = config.open_store();
    let requests = store.load_persisted().context("load persisted queue")?;
    let entries: Vec<Value> = requests
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "kind": r.kind(),
                "transport": r.transport(),
                "transport_id": r.transport_id,
                "origin": r.origin,
                "created_at": r.created_at,
                "shape": r.shape(),
                "groups": r.groups().len(),
            })
        })
        .collect();
    Ok(json!({"count": entries.len(), "requests": entries}))
}

fn cmd_inspect(opts: &ParsedArgs) -> Result<Value> {
    let path = opts.file.as_deref().ok_or_else(|| anyhow!("inspect needs a transaction file"))?;
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let transactions: Vec<DisplayableTransaction> =
        serde_json::from_str(&raw).with_context(|| format!("parse {path}"))?;

    for signer in &opts.signers {
        if !is_valid_address(signer) {
            warn!(signer = %signer, "signer is not a canonical address");
        }
    }
    let signable: SignableAddresses = opts.signers.iter().cloned().collect();
    let groups = group_transactions(transactions);
    let analysis = analyze_groups(&groups, &signable);

    Ok(json!({
        "shape": analysis.shape,
        "groups": analysis.group_count,
        "transactions": analysis.transaction_count,
        "total_fee": analysis.total_fee.to_string(),
        "total_fee_base_units": analysis.total_fee.base_units(),
        "warnings": analysis.warnings,
        "summary": analysis.summary,
    }))
}

fn cmd_clear(opts: &ParsedArgs) -> Result<Value> {
    let store = opts.store_config().open_store();
    let dropped = store.load_persisted().map(|r| r.len()).unwrap_or(0);
    store.purge().context("purge persisted queue")?;
    Ok(json!({"status": "cleared", "dropped": dropped}))
}

fn print_usage() {
    println!(
        r#"beesign - Sign request queue inspector

USAGE:
    beesign <command> [file] [options]

COMMANDS:
    pending                 List persisted (chain-transport) requests
    inspect <file>          Analyze a JSON array of transactions
    clear                   Purge the persisted queue

OPTIONS:
    --app, -a <name>        Application name (default: beesign)
    --data-dir, -d <path>   Data directory (env: BEESIGN_ROOT)
    --signer, -s <address>  Signable address for inspect (can repeat)
    --pretty                Pretty-print JSON
    --verbose, -v           Debug logging (env: RUST_LOG)
    --help, -h              Show this help
    --version, -V           Show version"#
    );
}
