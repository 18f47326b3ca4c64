//! Command-line front end for the assistant's local tools.
//!
//! `tools` prints the definitions to register with the hosted assistant,
//! `call` runs a tool the way the assistant would.

mod config;
mod functions;
mod weather;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doctools::{CallId, FunctionCall, ToolCollection};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::weather::ForecastFile;

#[derive(Debug, Parser)]
#[command(name = "assistant", version, about = "Local tools for a function-calling assistant")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, env = "ASSISTANT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tool definitions.
    Tools {
        /// Wrap them in the assistant configuration payload.
        #[arg(long)]
        assistant: bool,
    },

    /// Print the compiled schema of one tool.
    Schema { name: String },

    /// Invoke a tool with a JSON object of arguments.
    Call {
        name: String,

        #[arg(default_value = "{}")]
        arguments: String,

        /// Tool call id to echo back
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let tools = build_tools(&config)?;

    match cli.command {
        Commands::Tools { assistant } => cmd_tools(&tools, &config, assistant),
        Commands::Schema { name } => cmd_schema(&tools, &name),
        Commands::Call {
            name,
            arguments,
            id,
        } => cmd_call(&tools, name, &arguments, id).await,
    }
}

fn build_tools(config: &Config) -> Result<ToolCollection> {
    let mut tools = doctools::collect_tools().context("compiling tool schemas")?;

    match &config.forecast_file {
        Some(path) => weather::register(&mut tools, Arc::new(ForecastFile::new(path)))
            .context("registering weather tool")?,
        None => tracing::warn!(
            tool = weather::TOOL_NAME,
            "no forecast_file configured, weather tool disabled"
        ),
    }

    tracing::debug!(tools = ?tools, "tools ready");
    Ok(tools)
}

fn cmd_tools(tools: &ToolCollection, config: &Config, assistant: bool) -> Result<()> {
    let definitions = tools.json()?;
    let payload = if assistant {
        json!({
            "name": config.assistant_name,
            "instructions": config.instructions,
            "model": config.model,
            "tools": definitions,
        })
    } else {
        definitions
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn cmd_schema(tools: &ToolCollection, name: &str) -> Result<()> {
    let schema = tools
        .schema(name)
        .with_context(|| format!("no tool named '{name}'"))?;
    println!("{}", serde_json::to_string_pretty(schema)?);
    Ok(())
}

async fn cmd_call(
    tools: &ToolCollection,
    name: String,
    arguments: &str,
    id: Option<String>,
) -> Result<()> {
    let call = FunctionCall::from_encoded(id.map(CallId::from), name, arguments)
        .context("parsing tool arguments")?;
    let output = tools.call(call).await?;
    println!("{}", output.output);
    Ok(())
}
