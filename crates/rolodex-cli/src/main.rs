use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigArgs, check, export, serve, tools};

#[derive(Parser, Debug)]
#[command(name = "rolodex", version, about = "Contact network MCP server")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server (stdio or HTTP).
    Serve(serve::ServeArgs),

    /// Export the fallback tenant's network to a local file.
    Export(export::ExportArgs),

    /// Verify configuration, database connectivity and the fallback credential.
    Check,

    /// List tool definitions.
    Tools {
        /// Print each tool's input schema.
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve(args) => serve::run(&cli.config, args).await?,
        Command::Export(args) => return export::run(&cli.config, args).await,
        Command::Check => check::run(&cli.config).await?,
        Command::Tools { verbose } => tools::list(&cli.config, verbose)?,
    }

    Ok(ExitCode::SUCCESS)
}
