//! Demo host exposing the example tools through the registry.
//!
//! ```text
//! composite-tools list
//! composite-tools call get_weather --args '{"city_name": "beijing"}'
//! ```

mod tools;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::Value;
use toolbox::{Catalog, Registrar, ToolArgs, ToolRegistry, config, telemetry};
use tracing::info;

#[derive(Parser)]
#[command(about = "Register the demo tools and list or call them")]
struct Cli {
    /// TOML configuration file. Defaults to `toolbox.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tool catalog as JSON.
    List {
        /// Print planner-facing definitions with input schemas.
        #[arg(long)]
        schema: bool,
    },
    /// Dispatch one tool call and print its result.
    Call {
        /// Tool name.
        name: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_or_default(cli.config.as_deref())?;
    telemetry::init(&config.telemetry)?;

    let registry = ToolRegistry::new();
    let registrar =
        Registrar::new(&registry).with_duplicate_policy(config.registry.duplicate_policy);
    tools::register_all(&registrar).context("tool registration failed")?;
    info!(tools = registry.len(), "registry ready");

    match cli.command {
        Command::List { schema } => {
            let catalog = Catalog::new(&registry);
            let rendered = if schema {
                serde_json::to_string_pretty(&catalog.definitions())?
            } else {
                serde_json::to_string_pretty(&catalog.snapshot())?
            };
            println!("{rendered}");
        }
        Command::Call { name, args } => {
            let value: Value = serde_json::from_str(&args).context("--args is not valid JSON")?;
            let args = ToolArgs::try_from(value)
                .map_err(|other| anyhow!("--args must be a JSON object, got {other}"))?;
            println!("{}", registry.dispatch(&name, &args));
        }
    }

    Ok(())
}
