use std::path::PathBuf;

use clap::{Parser, Subcommand};
use resxify_cli::{MigrationConfig, run_migrate_command, run_sync_command};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log diagnostics at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync resource dictionaries, then replace literals in the source tree.
    Migrate {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Source tree root (overrides the configuration)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Mapping JSON file (overrides the configuration)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Report what would change without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Only append missing keys to the resource dictionaries.
    Sync {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Mapping JSON file (overrides the configuration)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Report what would change without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the regex generated for a template string.
    Pattern {
        /// Template such as "VM {0} created"
        template: String,

        /// Print the full code-file pattern, including the quotes
        #[arg(long)]
        code: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(
    path: Option<String>,
    root: Option<PathBuf>,
    mapping: Option<PathBuf>,
) -> MigrationConfig {
    let mut config = MigrationConfig::load(path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    if let Some(root) = root {
        config.root = root;
    }
    if let Some(mapping) = mapping {
        config.mapping = mapping;
    }
    config
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.commands {
        Commands::Migrate {
            config,
            root,
            mapping,
            dry_run,
        } => {
            let config = load_config(config, root, mapping);
            if let Err(e) = run_migrate_command(&config, dry_run) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Sync {
            config,
            mapping,
            dry_run,
        } => {
            let config = load_config(config, None, mapping);
            if let Err(e) = run_sync_command(&config, dry_run) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Pattern { template, code } => {
            let pattern = if code {
                resxify::code_literal_pattern(&template)
            } else {
                resxify::template_pattern(&template)
            };
            println!("{}", pattern);
        }
    }
}
