//! courierc - Binding checker and listing generator
//!
//! Commands:
//! - `courierc check` - Validate binding declarations
//! - `courierc plan` - Print the routing plan of each receiving type
//! - `courierc generate` - Write dispatcher and codec listings

use clap::{Parser, Subcommand, ValueEnum};
use courier_core::LogLevel;
use tracing_subscriber::EnvFilter;

mod check;
mod generate;
mod input;

#[derive(Parser)]
#[command(name = "courierc")]
#[command(author, version, about = "Checks and explains courier binding declarations", long_about = None)]
struct Cli {
    /// Log compiler decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Rust-like listings
    Text,
    /// Postal areas and codec plans as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate binding declarations (.toml or .json)
    Check {
        /// Path to the declarations file
        declarations: String,
    },

    /// Print the routing plan of each receiving type
    Plan {
        /// Path to the declarations file
        declarations: String,

        /// Only this declared type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
    },

    /// Write dispatcher and codec listings
    Generate {
        /// Path to the declarations file
        declarations: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { declarations } => {
            check::run(&declarations)?;
        }
        Commands::Plan {
            declarations,
            type_name,
        } => {
            generate::plan(&declarations, type_name.as_deref())?;
        }
        Commands::Generate {
            declarations,
            output,
            format,
        } => {
            generate::run(&declarations, output.as_deref(), format)?;
        }
    }

    Ok(())
}
