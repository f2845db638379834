pub mod check;
pub mod generate;

use crate::errors::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "implgen",
    version,
    about = "Code generator for API repository implementations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate missing implementation scaffolding
    Generate(generate::GenerateArgs),
    /// Report what generate would change, without writing
    Check(generate::GenerateArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => generate::run(&args),
        Commands::Check(args) => check::run(&args),
    }
}
