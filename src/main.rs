mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::context::{self, RunContext};
use cli::{Cli, Commands, OutputFormat};

fn main() {
    let args = Cli::parse();

    init_tracing(args.global.verbose);

    // JSON reports own stdout.
    let json = matches!(
        args.command,
        Commands::Import {
            format: OutputFormat::Json,
            ..
        }
    );
    cli::output::set_quiet(args.global.quiet || json);

    let result = match &args.command {
        Commands::Init { force } => {
            cli::commands::init::execute(&context::config_path(&args.global), *force)
        }
        Commands::Check => {
            RunContext::load(&args.global).and_then(|ctx| cli::commands::check::execute(&ctx))
        }
        Commands::Import {
            keys,
            keep_going,
            format,
        } => RunContext::load(&args.global).and_then(|ctx| {
            cli::commands::import::execute(&ctx, keys, *keep_going, *format)
        }),
        Commands::List => {
            RunContext::load(&args.global).and_then(|ctx| cli::commands::list::execute(&ctx))
        }
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`, `debug` with -v).
fn init_tracing(verbose: bool) {
    let default = if verbose { "keyring_sync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
