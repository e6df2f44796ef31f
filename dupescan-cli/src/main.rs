mod candidates;
mod scan;

use std::{io, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use crate::{
    candidates::run_candidates_command,
    scan::{ScanArgs, run_scan_command},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a registry dump for display names shared across mods.
    Scan(ScanArgs),

    /// List the registry folders found under a dump root.
    Candidates {
        /// Folder the registry dump mod exported into
        #[arg(long, value_name = "DIR")]
        dump_root: PathBuf,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.commands {
        Commands::Scan(scan_args) => run_scan_command(scan_args),
        Commands::Candidates { dump_root } => run_candidates_command(&dump_root),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "dupescan", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
