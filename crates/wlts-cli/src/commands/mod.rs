//! Command implementations

mod config;
mod describe;
mod doctor;
mod list;
mod trajectory;

use crate::cli::{Cli, Commands};
use crate::context;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let settings = context::load_config(&cli)?;
    let roles = cli.caller_roles();

    match cli.command {
        Commands::Config => config::execute(&settings, &output),
        Commands::List => list::execute(&context::load_service(&settings)?, &roles, &output),
        Commands::Describe(args) => {
            describe::execute(args, &context::load_service(&settings)?, &roles, &output)
        }
        Commands::Trajectory(args) => {
            trajectory::execute(args, &context::load_service(&settings)?, &roles, &output).await
        }
        Commands::Doctor(args) => {
            doctor::execute(args, &context::load_service(&settings)?, &roles, &output).await
        }
    }
}
