//! scm-publish CLI
//!
//! Mirrors a generated content tree into a version-controlled repository.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!(
                "{} publish a content tree to a repository",
                "scm-publish".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "scm-publish --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}: logging already initialized", "warning".yellow());
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Publish(args) => {
            let cwd = std::env::current_dir()?;
            commands::run_publish(&cwd, &args)
        }
        Commands::Init {
            url,
            content,
            force,
        } => {
            let cwd = std::env::current_dir()?;
            commands::run_init(&cwd, url.as_deref(), content.as_deref(), force)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "scm-publish",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
