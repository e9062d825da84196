use std::{io, path::{Path, PathBuf}};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dialog_graph::{
    Dispatcher, IncomingMessage, config::RuntimeConfig, console::ConsoleContext,
    definition::GraphDefinition, derive_key, logger::init_tracing,
};
use schemars::schema_for;
use tracing::{info, warn};

type Console = ConsoleContext<io::Stdout>;

#[derive(Parser, Debug)]
#[command(
    name = "dialog-graph",
    about = "Build, check and exercise payload-routed dialogue graphs",
    version
)]
struct Cli {
    /// Log level override (e.g. error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// `.env` file to load before reading configuration
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and build a definition, then report on its shape
    Validate { file: PathBuf },

    /// Dispatch one message against a definition, printing every send
    Simulate(SimulateArgs),

    /// Print the routing key derived from a node name
    Key { name: String },

    /// Emit the JSON Schema of the definition format
    Schema,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    file: PathBuf,

    /// Postback payload
    #[arg(long)]
    postback: Option<String>,

    /// Quick-reply payload
    #[arg(long)]
    quick_reply: Option<String>,

    /// Send a postback to the node with this name
    #[arg(long, conflicts_with = "postback")]
    to: Option<String>,

    /// Send the get-started postback
    #[arg(long, conflicts_with_all = ["postback", "to"])]
    get_started: bool,

    /// Full message as JSON; overrides the other message flags
    #[arg(long)]
    message_json: Option<String>,
}

impl SimulateArgs {
    fn message(&self) -> anyhow::Result<IncomingMessage> {
        if let Some(json) = &self.message_json {
            return serde_json::from_str(json).context("invalid --message-json");
        }

        let postback = if self.get_started {
            Some(dialog_graph::GET_STARTED_PAYLOAD.to_string())
        } else {
            self.to.as_deref().map(derive_key).or_else(|| self.postback.clone())
        };
        let mut msg = postback.map(IncomingMessage::postback).unwrap_or_default();
        if let Some(payload) = &self.quick_reply {
            msg = msg.with_quick_reply(payload.clone());
        }
        Ok(msg)
    }
}

fn load(file: &Path) -> anyhow::Result<(GraphDefinition, Dispatcher<Console>)> {
    let definition = GraphDefinition::from_file(file)
        .with_context(|| format!("could not load {}", file.display()))?;
    let mut builder = definition.to_builder::<Console>()?;
    builder.on_unhandled(|_ctx, msg| {
        info!(incoming = %serde_json::to_string(msg).unwrap_or_default(), "unhandled hook");
    });
    let dispatcher = builder.build()?;
    Ok((definition, dispatcher))
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let (definition, dispatcher) = load(file)?;
    let graph = dispatcher.graph();

    println!("nodes: {}", graph.node_count());
    println!("links: {}", graph.edge_count());
    println!("cycles: {}", graph.has_cycles());

    match definition.get_started_key() {
        Some(start) => {
            let unreachable = graph.unreachable_from(&start);
            if unreachable.is_empty() {
                println!("every node is reachable from get-started");
            } else {
                for name in unreachable {
                    warn!(node = %name, "not reachable from get-started");
                    println!("unreachable: {name}");
                }
            }
        }
        None => println!("no get-started node; skipping reachability"),
    }
    Ok(())
}

fn simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let (_, dispatcher) = load(&args.file)?;
    let msg = args.message()?;
    let mut ctx = ConsoleContext::new(io::stdout());
    let report = dispatcher.dispatch(&mut ctx, &msg);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, env_file) = RuntimeConfig::load(cli.env_file.as_deref());
    let config = config.with_log_level(cli.log_level);
    init_tracing(&config.log_config())?;
    env_file.log();

    match cli.command {
        Commands::Validate { file } => validate(&file),
        Commands::Simulate(args) => simulate(&args),
        Commands::Key { name } => {
            println!("{}", derive_key(&name));
            Ok(())
        }
        Commands::Schema => {
            let schema = schema_for!(GraphDefinition);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}
