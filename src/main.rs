//! hashscope command driver.
//!
//! Reads one command per line from stdin and writes one JSON response per
//! line to stdout. Logs go to stderr.

use clap::Parser;
use hashscope::HashTable;
use hashscope::config::Config;
use hashscope::logging;
use hashscope::session::Session;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hashscope")]
#[command(about = "Instrumented hash table driven by line commands")]
struct Args {
    /// Path to configuration file
    config: Option<PathBuf>,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Pretty-print JSON responses
    #[arg(long)]
    pretty: bool,
}

fn main() {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return;
    }

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    logging::init(&config.logging);

    if let Err(e) = run(config, args.pretty) {
        tracing::error!(error = %e, "session error");
        std::process::exit(1);
    }
}

fn run(config: Config, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (options, substitutions) = config.table.options();
    for substitution in &substitutions {
        tracing::warn!(%substitution, "configured strategy replaced");
    }

    let table = HashTable::with_options(options)?;
    let (hashing, collision) = table.strategies();
    tracing::info!(
        size = table.size(),
        table_size = table.table_size(),
        %hashing,
        %collision,
        "table ready"
    );

    let mut session = Session::new(table);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if matches!(trimmed, "quit" | "exit") {
            break;
        }

        match session.run_line(trimmed) {
            Ok(response) => {
                let rendered = if pretty {
                    serde_json::to_string_pretty(&response)?
                } else {
                    serde_json::to_string(&response)?
                };
                writeln!(out, "{}", rendered)?;
            }
            Err(e) => {
                tracing::warn!(command = trimmed, error = %e, "command failed");
                let rendered = serde_json::json!({
                    "command": trimmed,
                    "error": e.to_string(),
                });
                writeln!(out, "{}", rendered)?;
            }
        }
        out.flush()?;
    }

    tracing::info!(items = session.table().item_count(), "session finished");
    Ok(())
}

fn print_default_config() {
    let config = r#"# hashscope configuration

[table]
# Requested capacity. Open addressing rounds up to the next prime.
size = 11
# Hashing strategy: "simple" or "universal"
hashing = "simple"
# Collision resolution: "chaining", "linear-probing", or "double-hashing"
collision = "chaining"
# When universal parameters are redrawn: "on-strategy-change" or "on-resize"
universal_regeneration = "on-strategy-change"
# Load factor at which open addressing inserts recommend a resize
load_factor_warning = 0.7
# Fixed seed for universal parameters (random if unset)
# seed = 42

[logging]
# Log level: "error", "warn", "info", "debug", "trace"
# Can be overridden with RUST_LOG environment variable
level = "info"
# Log format: "pretty" (human-readable), "json", or "compact"
format = "pretty"
# Include timestamps
timestamps = true
# Include module target
target = true
"#;
    print!("{}", config);
}
