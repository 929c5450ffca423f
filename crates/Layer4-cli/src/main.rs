//! plexus CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use plexus_core::{builtin, Api, Call};
use plexus_foundation::parse_override;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// plexus - plugin registry and command runner
#[derive(Parser, Debug)]
#[command(name = "plexus")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Set environment variable KEY to VALUE (repeatable, first one wins)
    #[arg(short = 'e', value_name = "KEY=VALUE", global = true)]
    env: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all loaded plugins
    Plugins,
    /// Show environment variables
    Env {
        /// Variable names to show (default: all)
        variables: Vec<String>,
        /// Show the server's environment instead of the local one
        #[arg(long)]
        server: bool,
    },
    /// Call a command by name
    Call {
        /// Command name
        name: String,
        /// Positional arguments
        args: Vec<String>,
        /// Named option (repeatable)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let overrides = args
        .env
        .iter()
        .map(|pair| parse_override(pair))
        .collect::<Result<Vec<_>, _>>()?;

    let mut api = Api::new();
    api.bootstrap(overrides)?;
    builtin::register_all(&mut api)?;
    let api = api.finalize()?;

    let (name, call) = match args.command {
        Command::Plugins => ("plugins".to_string(), Call::new()),
        Command::Env { variables, server } => {
            let mut call = Call::from_args(variables);
            if server {
                call = call.option("server", true);
            }
            ("env".to_string(), call)
        }
        Command::Call {
            name,
            args,
            options,
        } => {
            let options = options
                .iter()
                .map(|pair| cli::parse_option(pair))
                .collect::<anyhow::Result<Vec<_>>>()?;
            (name, cli::build_call(&args, &options))
        }
    };

    cli::run_command(&api, &name, call).await
}
